//! 私信接口：收件箱、会话、发送
//! Private messages: inbox, conversation, send

use actix_web::{web, HttpResponse, Responder, Result};
use sa_token_plugin_actix_web::{sa_check_login, LoginIdExtractor};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::current_user_id;
use crate::error::AppError;
use crate::modules::usuarios::models::agrupar_conversaciones;
use crate::modules::usuarios::repo;

#[derive(Debug, Deserialize)]
pub struct MensajeRequest {
    #[serde(default)]
    pub asunto: String,
    pub cuerpo: String,
}

/// 收件箱：按对话对象折叠，每个会话保留最近一条消息
#[actix_web::get("/usuarios/mensajes")]
#[sa_check_login]
pub async fn inbox(pool: web::Data<PgPool>, login_id: LoginIdExtractor) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;

    let mensajes = repo::mensajes_de_usuario(&pool, uid).await?;
    let conversaciones = agrupar_conversaciones(&mensajes, uid);

    // 对方用户信息
    let other_ids: Vec<i64> = conversaciones.iter().map(|c| c.other_user_id).collect();
    let usuarios = repo::buscar_por_ids(&pool, &other_ids).await?;
    let por_id: std::collections::HashMap<i64, _> =
        usuarios.into_iter().map(|u| (u.id, u)).collect();

    let items: Vec<serde_json::Value> = conversaciones
        .iter()
        .filter_map(|c| {
            por_id.get(&c.other_user_id).map(|u| {
                json!({
                    "other_user": { "id": u.id, "username": u.username },
                    "last_message": c.last_message,
                })
            })
        })
        .collect();

    let unread_count = repo::no_leidos(&pool, uid).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "conversations": items,
            "unread_messages_count": unread_count,
        }
    })))
}

/// 未读消息数（导航栏角标）
#[actix_web::get("/usuarios/mensajes/no-leidos")]
#[sa_check_login]
pub async fn no_leidos(
    pool: web::Data<PgPool>,
    login_id: LoginIdExtractor,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    let count = repo::no_leidos(&pool, uid).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": { "unread_messages_count": count }
    })))
}

/// 与某用户的完整会话；打开时把对方发来的消息标记为已读
#[actix_web::get("/usuarios/mensajes/{username}")]
#[sa_check_login]
pub async fn conversacion(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    login_id: LoginIdExtractor,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    let other = repo::buscar_por_username(&pool, &path.into_inner()).await?;

    let mensajes = repo::conversacion(&pool, uid, other.id).await?;
    repo::marcar_leidos(&pool, uid, other.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "other_user": { "id": other.id, "username": other.username },
            "messages": mensajes,
        }
    })))
}

/// 发送私信；对方关闭私信或发给自己时拒绝
#[actix_web::post("/usuarios/mensajes/{username}")]
#[sa_check_login]
pub async fn enviar(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    login_id: LoginIdExtractor,
    req: web::Json<MensajeRequest>,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    let other = repo::buscar_por_username(&pool, &path.into_inner()).await?;

    if other.id == uid {
        return Err(
            AppError::validation("destinatario", "no puedes enviarte mensajes a ti mismo").into(),
        );
    }
    if req.cuerpo.trim().is_empty() {
        return Err(AppError::validation("cuerpo", "el mensaje no puede estar vacío").into());
    }

    let perfil_other = repo::perfil_de(&pool, other.id).await?;
    if !perfil_other.permitir_mensajes_privados {
        return Err(AppError::permission("este usuario no acepta mensajes privados").into());
    }

    let mensaje =
        repo::enviar_mensaje(&pool, uid, other.id, req.asunto.trim(), req.cuerpo.trim()).await?;

    Ok(HttpResponse::Created().json(json!({
        "code": 0,
        "message": "mensaje enviado",
        "data": mensaje
    })))
}
