use actix_web::{web, HttpResponse, Responder, Result};
use sa_token_plugin_actix_web::{sa_check_login, LoginIdExtractor};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::current_user_id;
use crate::error::AppError;
use crate::modules::recetas::repo as recetas_repo;
use crate::modules::usuarios::repo;

#[derive(Debug, Deserialize)]
pub struct CategoriaFavoritaRequest {
    pub nombre: String,
}

#[derive(Debug, Deserialize)]
pub struct AddToCategoryRequest {
    pub categoria_id: i64,
}

/// 收藏夹：收藏列表 + 本人的收藏分组
#[actix_web::get("/usuarios/perfil/favoritos")]
#[sa_check_login]
pub async fn listar(
    pool: web::Data<PgPool>,
    login_id: LoginIdExtractor,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    let recetas_favoritas = repo::favoritas_de(&pool, uid).await?;
    let categorias_favoritas = repo::listar_categorias_favoritas(&pool, uid).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "recetas_favoritas": recetas_favoritas,
            "categorias_favoritas": categorias_favoritas,
        }
    })))
}

/// 创建收藏分组；同名分组（同一用户）报验证错误
#[actix_web::post("/usuarios/perfil/favoritos/categorias")]
#[sa_check_login]
pub async fn crear_categoria(
    pool: web::Data<PgPool>,
    login_id: LoginIdExtractor,
    req: web::Json<CategoriaFavoritaRequest>,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    let nombre = req.nombre.trim();
    if nombre.is_empty() {
        return Err(AppError::validation("nombre", "el nombre es obligatorio").into());
    }

    let categoria = repo::crear_categoria_favorita(&pool, uid, nombre)
        .await
        .map_err(|e| match e {
            AppError::Validation { .. } => {
                AppError::validation("nombre", "ya tienes una categoría con ese nombre")
            }
            other => other,
        })?;

    Ok(HttpResponse::Created().json(json!({
        "code": 0,
        "message": "categoría creada",
        "data": categoria
    })))
}

/// 重命名收藏分组
#[actix_web::put("/usuarios/perfil/favoritos/categorias/{id}")]
#[sa_check_login]
pub async fn renombrar_categoria(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    login_id: LoginIdExtractor,
    req: web::Json<CategoriaFavoritaRequest>,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    let nombre = req.nombre.trim();
    if nombre.is_empty() {
        return Err(AppError::validation("nombre", "el nombre es obligatorio").into());
    }

    let categoria = repo::renombrar_categoria_favorita(&pool, uid, path.into_inner(), nombre)
        .await
        .map_err(|e| match e {
            AppError::Validation { .. } => {
                AppError::validation("nombre", "ya tienes una categoría con ese nombre")
            }
            other => other,
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "categoría actualizada",
        "data": categoria
    })))
}

/// 删除收藏分组；分组下的收藏保留，仅清空分组字段
#[actix_web::delete("/usuarios/perfil/favoritos/categorias/{id}")]
#[sa_check_login]
pub async fn eliminar_categoria(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    login_id: LoginIdExtractor,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    repo::eliminar_categoria_favorita(&pool, uid, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "categoría eliminada",
        "data": null
    })))
}

/// 收藏开关：已收藏则取消，未收藏则加入
#[actix_web::post("/usuarios/toggle-favorito/{receta_id}")]
#[sa_check_login]
pub async fn toggle_favorito(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    login_id: LoginIdExtractor,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    let receta_id = path.into_inner();

    // 菜谱必须存在
    recetas_repo::receta_por_id(&pool, receta_id).await?;

    let es_favorito = repo::toggle_favorito(&pool, uid, receta_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "receta_id": receta_id,
            "es_favorito": es_favorito,
        }
    })))
}

/// 把菜谱加入收藏分组（收藏行不存在时先创建）
#[actix_web::post("/usuarios/add-to-category/{receta_id}")]
#[sa_check_login]
pub async fn add_to_category(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    login_id: LoginIdExtractor,
    req: web::Json<AddToCategoryRequest>,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    let receta_id = path.into_inner();

    recetas_repo::receta_por_id(&pool, receta_id).await?;
    repo::asignar_categoria(&pool, uid, receta_id, req.categoria_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "receta añadida a la categoría",
        "data": {
            "receta_id": receta_id,
            "categoria_id": req.categoria_id,
        }
    })))
}
