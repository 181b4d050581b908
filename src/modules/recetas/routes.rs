use actix_web::web;

use super::controller::{admin, busqueda, categorias, comentarios, paginas, recetas};

/// recetas 模块的路由配置
/// 固定路径必须先于 /recetas/{id} 注册，避免被参数路由吞掉
/// Fixed paths must be registered before /recetas/{id}
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(recetas::home)
        .service(recetas::populares)
        .service(recetas::descubre)
        .service(busqueda::avanzada)
        .service(busqueda::simple)
        .service(recetas::previsualizar)
        .service(recetas::por_categoria)
        .service(recetas::crear)
        .service(comentarios::crear)
        .service(recetas::detalle)
        .service(recetas::editar)
        .service(recetas::eliminar)
        .service(comentarios::editar)
        .service(comentarios::eliminar)
        .service(categorias::listar)
        .service(categorias::crear)
        .service(categorias::editar)
        .service(categorias::eliminar)
        .service(admin::opciones)
        .service(admin::recetas)
        .service(admin::categorias)
        .service(admin::usuarios)
        .service(admin::comentarios)
        .service(paginas::acerca_de)
        .service(paginas::contacto);
}
