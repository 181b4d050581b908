//! 管理面板的 JSON 接口：各区块按需加载
//! Admin panel JSON endpoints: each section loads on demand

use actix_web::{web, HttpResponse, Responder, Result};
use sa_token_plugin_actix_web::sa_check_role;
use serde_json::json;
use sqlx::PgPool;

use crate::modules::recetas::repo;
use crate::modules::usuarios::repo as usuarios_repo;

/// 面板入口：预加载菜谱列表
#[actix_web::get("/admin/opciones")]
#[sa_check_role("admin")]
pub async fn opciones(pool: web::Data<PgPool>) -> Result<impl Responder> {
    let lista_recetas = repo::listar_recetas(&pool, None, "fecha_publicacion", "desc").await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": { "recetas": lista_recetas }
    })))
}

/// 菜谱区块
#[actix_web::get("/admin/recetas")]
#[sa_check_role("admin")]
pub async fn recetas(pool: web::Data<PgPool>) -> Result<impl Responder> {
    let recetas = repo::listar_recetas(&pool, None, "fecha_publicacion", "desc").await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": recetas
    })))
}

/// 分类区块
#[actix_web::get("/admin/categorias")]
#[sa_check_role("admin")]
pub async fn categorias(pool: web::Data<PgPool>) -> Result<impl Responder> {
    let categorias = repo::listar_categorias(&pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": categorias
    })))
}

/// 用户区块
#[actix_web::get("/admin/usuarios")]
#[sa_check_role("admin")]
pub async fn usuarios(pool: web::Data<PgPool>) -> Result<impl Responder> {
    let usuarios = usuarios_repo::listar_usuarios(&pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": usuarios
    })))
}

/// 评论区块
#[actix_web::get("/admin/comentarios")]
#[sa_check_role("admin")]
pub async fn comentarios(pool: web::Data<PgPool>) -> Result<impl Responder> {
    let comentarios = repo::comentarios_admin(&pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": comentarios
    })))
}
