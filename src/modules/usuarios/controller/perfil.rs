use actix_web::{web, HttpResponse, Responder, Result};
use chrono::Utc;
use sa_token_plugin_actix_web::{sa_check_login, LoginIdExtractor};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::{current_user_id, hash_password, verify_password};
use crate::error::AppError;
use crate::modules::usuarios::repo;

#[derive(Debug, Deserialize)]
pub struct PerfilUpdateRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub fecha_nacimiento: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub localidad: Option<String>,
    #[serde(default)]
    pub pais: Option<String>,
    #[serde(default)]
    pub acerca_de_mi: Option<String>,
}

/// 安全页有两个提交入口：修改密码和通知/隐私开关
/// The security page has two submit paths: password change and the toggles
#[derive(Debug, Deserialize)]
pub struct SeguridadRequest {
    #[serde(default)]
    pub change_password: Option<CambioPassword>,
    #[serde(default)]
    pub seguridad_settings: Option<SeguridadSettings>,
}

#[derive(Debug, Deserialize)]
pub struct CambioPassword {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SeguridadSettings {
    pub recibir_emails_recetas_nuevas: bool,
    pub recibir_emails_mensajes_privados: bool,
    pub permitir_mensajes_privados: bool,
    pub mostrar_cumpleanos: bool,
    pub mostrar_edad: bool,
}

/// 本人资料
#[actix_web::get("/usuarios/perfil")]
#[sa_check_login]
pub async fn ver(pool: web::Data<PgPool>, login_id: LoginIdExtractor) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    let usuario = repo::buscar_por_id(&pool, uid).await?;
    let perfil = repo::perfil_de(&pool, uid).await?;
    let edad = perfil.edad(Utc::now().date_naive());

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "usuario": usuario,
            "perfil": perfil,
            "edad": edad,
        }
    })))
}

/// 编辑资料：账号字段与资料字段一起提交
#[actix_web::put("/usuarios/perfil")]
#[sa_check_login]
pub async fn editar(
    pool: web::Data<PgPool>,
    login_id: LoginIdExtractor,
    req: web::Json<PerfilUpdateRequest>,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;

    if req.username.trim().is_empty() {
        return Err(AppError::validation("username", "el usuario es obligatorio").into());
    }
    if !req.email.contains('@') {
        return Err(AppError::validation("email", "correo inválido").into());
    }

    let usuario = repo::actualizar_usuario(
        &pool,
        uid,
        req.username.trim(),
        &req.email,
        &req.first_name,
        &req.last_name,
    )
    .await
    .map_err(|e| match e {
        AppError::Validation { .. } => AppError::validation("username", "el usuario ya existe"),
        other => other,
    })?;

    let perfil = repo::actualizar_perfil(
        &pool,
        uid,
        req.avatar.as_deref(),
        req.nickname.as_deref(),
        req.fecha_nacimiento,
        req.localidad.as_deref(),
        req.pais.as_deref(),
        req.acerca_de_mi.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "perfil actualizado",
        "data": {
            "usuario": usuario,
            "perfil": perfil,
        }
    })))
}

/// 安全页：修改密码或更新通知/隐私开关
#[actix_web::put("/usuarios/perfil/seguridad")]
#[sa_check_login]
pub async fn seguridad(
    pool: web::Data<PgPool>,
    login_id: LoginIdExtractor,
    req: web::Json<SeguridadRequest>,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;

    if req.change_password.is_none() && req.seguridad_settings.is_none() {
        return Err(AppError::validation("request", "no hay nada que actualizar").into());
    }

    if let Some(cambio) = &req.change_password {
        let usuario = repo::buscar_por_id(&pool, uid).await?;
        if !verify_password(&cambio.old_password, &usuario.password_hash)? {
            return Err(
                AppError::validation("old_password", "la contraseña actual no es correcta").into(),
            );
        }
        if cambio.new_password.len() < 8 {
            return Err(AppError::validation(
                "new_password",
                "la contraseña debe tener al menos 8 caracteres",
            )
            .into());
        }
        let hash = hash_password(&cambio.new_password)?;
        repo::actualizar_password(&pool, uid, &hash).await?;
        // 会话保持有效，无需重新登录
    }

    if let Some(settings) = &req.seguridad_settings {
        repo::actualizar_seguridad(
            &pool,
            uid,
            settings.recibir_emails_recetas_nuevas,
            settings.recibir_emails_mensajes_privados,
            settings.permitir_mensajes_privados,
            settings.mostrar_cumpleanos,
            settings.mostrar_edad,
        )
        .await?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "preferencias actualizadas",
        "data": null
    })))
}

/// 本人发表的顶层评论
#[actix_web::get("/usuarios/perfil/mis-comentarios")]
#[sa_check_login]
pub async fn mis_comentarios(
    pool: web::Data<PgPool>,
    login_id: LoginIdExtractor,
) -> Result<impl Responder> {
    let uid = current_user_id(&login_id)?;
    let comentarios = repo::mis_comentarios(&pool, uid).await?;

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": comentarios
    })))
}
