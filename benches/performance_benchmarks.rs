use criterion::{black_box, criterion_group, criterion_main, Criterion};

use recetas_blog::comm::pagination::paginate;
use recetas_blog::comm::slug::slugify;
use recetas_blog::modules::recetas::repo::like_pattern;
use recetas_blog::modules::usuarios::models::{agrupar_conversaciones, Mensaje};

fn bench_slugify(c: &mut Criterion) {
    c.bench_function("slugify", |b| {
        b.iter(|| slugify(black_box("Cocina Española: Paella & Fideuá al 100%")))
    });
}

fn bench_like_pattern(c: &mut Criterion) {
    c.bench_function("like_pattern", |b| {
        b.iter(|| like_pattern(black_box("tortilla_100%")))
    });
}

fn bench_paginate(c: &mut Criterion) {
    c.bench_function("paginate", |b| {
        b.iter(|| paginate(black_box(Some("37")), black_box(12), black_box(100_000)))
    });
}

fn bench_agrupar_conversaciones(c: &mut Criterion) {
    let mensajes: Vec<Mensaje> = (0..1000)
        .map(|i| Mensaje {
            id: i,
            remitente_id: if i % 2 == 0 { 1 } else { i % 50 },
            destinatario_id: if i % 2 == 0 { i % 50 } else { 1 },
            asunto: String::new(),
            cuerpo: "hola".to_string(),
            fecha_envio: chrono::Utc::now(),
            leido: false,
        })
        .collect();

    c.bench_function("agrupar_conversaciones", |b| {
        b.iter(|| agrupar_conversaciones(black_box(&mensajes), black_box(1)))
    });
}

criterion_group!(
    benches,
    bench_slugify,
    bench_like_pattern,
    bench_paginate,
    bench_agrupar_conversaciones
);
criterion_main!(benches);
