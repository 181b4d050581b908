use actix_web::{web, HttpResponse, Responder, Result};
use sa_token_plugin_actix_web::{sa_check_login, LoginIdExtractor};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::current_user_id;
use crate::error::AppError;
use crate::modules::recetas::repo;
use crate::modules::usuarios::repo as usuarios_repo;

#[derive(Debug, Deserialize)]
pub struct ComentarioRequest {
    pub texto: String,
    #[serde(default)]
    pub respuesta_a: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ComentarioEditRequest {
    pub texto: String,
}

fn validar_texto(texto: &str) -> Result<(), AppError> {
    if texto.trim().is_empty() {
        return Err(AppError::validation("texto", "el comentario no puede estar vacío"));
    }
    Ok(())
}

/// 发表评论或回复（需要登录）
#[actix_web::post("/recetas/{id}/comentarios")]
#[sa_check_login]
pub async fn crear(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    login_id: LoginIdExtractor,
    req: web::Json<ComentarioRequest>,
) -> Result<impl Responder> {
    let receta_id = path.into_inner();
    let uid = current_user_id(&login_id)?;
    validar_texto(&req.texto)?;

    // 菜谱必须存在
    repo::receta_por_id(&pool, receta_id).await?;

    let comentario =
        repo::crear_comentario(&pool, receta_id, uid, req.texto.trim(), req.respuesta_a).await?;

    Ok(HttpResponse::Created().json(json!({
        "code": 0,
        "message": "comentario publicado",
        "data": comentario
    })))
}

/// 编辑评论（仅作者）
#[actix_web::put("/comentarios/{id}")]
#[sa_check_login]
pub async fn editar(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    login_id: LoginIdExtractor,
    req: web::Json<ComentarioEditRequest>,
) -> Result<impl Responder> {
    let comentario_id = path.into_inner();
    let uid = current_user_id(&login_id)?;
    validar_texto(&req.texto)?;

    let comentario = repo::comentario_por_id(&pool, comentario_id).await?;
    if comentario.autor_id != uid {
        return Err(AppError::permission("no tienes permiso para editar este comentario").into());
    }

    let actualizado = repo::actualizar_comentario(&pool, comentario_id, req.texto.trim()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "comentario actualizado",
        "data": actualizado
    })))
}

/// 删除评论（作者或超级用户）
#[actix_web::delete("/comentarios/{id}")]
#[sa_check_login]
pub async fn eliminar(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    login_id: LoginIdExtractor,
) -> Result<impl Responder> {
    let comentario_id = path.into_inner();
    let uid = current_user_id(&login_id)?;

    let comentario = repo::comentario_por_id(&pool, comentario_id).await?;
    if comentario.autor_id != uid {
        let usuario = usuarios_repo::buscar_por_id(&pool, uid).await?;
        if !usuario.is_superuser {
            return Err(
                AppError::permission("no tienes permiso para eliminar este comentario").into(),
            );
        }
    }

    repo::eliminar_comentario(&pool, comentario_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "comentario eliminado",
        "data": { "receta_id": comentario.receta_id }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validar_texto_vacio() {
        assert!(validar_texto("   ").is_err());
        assert!(validar_texto("¡Muy rica!").is_ok());
    }
}
