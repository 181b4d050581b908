use actix_web::{web, HttpResponse, Responder, Result};
use sa_token_plugin_actix_web::sa_check_role;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::modules::recetas::repo;

#[derive(Debug, Deserialize)]
pub struct CategoriaRequest {
    pub nombre: String,
}

/// 分类列表（管理员）
#[actix_web::get("/categorias")]
#[sa_check_role("admin")]
pub async fn listar(pool: web::Data<PgPool>) -> Result<impl Responder> {
    let categorias = repo::listar_categorias(&pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": categorias
    })))
}

/// 创建分类（管理员），slug 由名称生成
#[actix_web::post("/categorias")]
#[sa_check_role("admin")]
pub async fn crear(
    pool: web::Data<PgPool>,
    req: web::Json<CategoriaRequest>,
) -> Result<impl Responder> {
    let categoria = repo::crear_categoria(&pool, req.nombre.trim()).await?;

    Ok(HttpResponse::Created().json(json!({
        "code": 0,
        "message": "categoría creada",
        "data": categoria
    })))
}

/// 重命名分类（管理员）
#[actix_web::put("/categorias/{slug}")]
#[sa_check_role("admin")]
pub async fn editar(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    req: web::Json<CategoriaRequest>,
) -> Result<impl Responder> {
    let slug = path.into_inner();
    let categoria = repo::actualizar_categoria(&pool, &slug, req.nombre.trim()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "categoría actualizada",
        "data": categoria
    })))
}

/// 删除分类（管理员）；引用它的菜谱保留，分类字段置空
#[actix_web::delete("/categorias/{slug}")]
#[sa_check_role("admin")]
pub async fn eliminar(pool: web::Data<PgPool>, path: web::Path<String>) -> Result<impl Responder> {
    let slug = path.into_inner();
    repo::eliminar_categoria(&pool, &slug).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "categoría eliminada",
        "data": null
    })))
}
