use actix_web::{web, HttpResponse, Responder, Result};
use sa_token_plugin_actix_web::{sa_ignore, LoginIdExtractor};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::current_user_id;
use crate::modules::recetas::repo::{self, FiltrosAvanzados};
use crate::modules::usuarios::repo as usuarios_repo;

#[derive(Debug, Deserialize)]
pub struct BusquedaSimpleQuery {
    pub q: Option<String>,
    pub order_by: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BusquedaAvanzadaQuery {
    pub exact_phrase: Option<String>,
    pub similar_words: Option<String>,
    pub ingredient: Option<String>,
    pub category: Option<String>,
}

async fn favoritas_del_usuario(pool: &PgPool, login_id: &Option<LoginIdExtractor>) -> Vec<i64> {
    if let Some(login) = login_id {
        if let Ok(uid) = current_user_id(login) {
            return usuarios_repo::ids_favoritas(pool, uid)
                .await
                .unwrap_or_default();
        }
    }
    Vec::new()
}

/// 简单搜索：关键字匹配标题或描述
#[actix_web::get("/recetas/buscar")]
#[sa_ignore]
pub async fn simple(
    pool: web::Data<PgPool>,
    query: web::Query<BusquedaSimpleQuery>,
    login_id: Option<LoginIdExtractor>,
) -> Result<impl Responder> {
    let q = query.q.as_deref().unwrap_or("").trim().to_string();
    let order_by = query.order_by.as_deref().unwrap_or("fecha_publicacion");
    let direction = query.direction.as_deref().unwrap_or("desc");

    // 客户端用它来拼接排序/分页参数
    // The client extends this string with sort/page params
    let base_query_string = if q.is_empty() {
        String::new()
    } else {
        format!("q={}", urlencoding::encode(&q))
    };

    let results = if q.is_empty() {
        Vec::new()
    } else {
        repo::buscar_simple(&pool, &q, order_by, direction).await?
    };

    let favoritas_ids = favoritas_del_usuario(&pool, &login_id).await;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "query": q,
            "results": results,
            "search_type": "simple",
            "current_order_by": order_by,
            "current_direction": direction,
            "base_query_string": base_query_string,
            "favoritas_ids": favoritas_ids,
        }
    })))
}

/// 高级搜索：相似词（OR）、精确短语、配料、分类逐组 AND 过滤
#[actix_web::get("/recetas/buscar/avanzada")]
#[sa_ignore]
pub async fn avanzada(
    pool: web::Data<PgPool>,
    query: web::Query<BusquedaAvanzadaQuery>,
    login_id: Option<LoginIdExtractor>,
) -> Result<impl Responder> {
    let exact_phrase = query
        .exact_phrase
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);
    let similar_words: Vec<String> = query
        .similar_words
        .as_deref()
        .unwrap_or("")
        .split_whitespace()
        .map(String::from)
        .collect();
    let ingredient = query
        .ingredient
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);
    let category_slug = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    // 分类 slug 未知时直接忽略该过滤条件
    let categoria_id = match &category_slug {
        Some(slug) => repo::categoria_por_slug(&pool, slug).await?.map(|c| c.id),
        None => None,
    };

    let filtros = FiltrosAvanzados {
        similar_words: similar_words.clone(),
        exact_phrase: exact_phrase.clone(),
        ingredient: ingredient.clone(),
        categoria_id,
    };

    let recetas = repo::buscar_avanzada(&pool, &filtros).await?;
    let categorias = repo::listar_categorias(&pool).await?;
    let favoritas_ids = favoritas_del_usuario(&pool, &login_id).await;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "recetas": recetas,
            "categories": categorias,
            "selected_category": category_slug,
            "favoritas_ids": favoritas_ids,
            "exact_phrase": exact_phrase,
            "similar_words": similar_words.join(" "),
            "ingredient": ingredient,
        }
    })))
}
