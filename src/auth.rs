//! 认证相关代码：注册、登录、登出
//! Authentication: registration, login, logout

use actix_web::web;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use regex::Regex;
use sa_token_plugin_actix_web::{sa_check_login, sa_ignore, LoginIdExtractor, SaTokenState};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{ApiResponse, AppError, AppResult};
use crate::modules::usuarios::repo as usuarios_repo;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.@+-]{1,150}$").unwrap();
}

// ==================== 请求/响应类型 ====================
// ==================== Request/Response Types ====================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegistroRequest {
    pub username: String,
    pub password: String,
    pub password2: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_info: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

// ==================== 密码哈希 ====================
// ==================== Password hashing ====================

/// 用 Argon2id 哈希密码，返回 PHC 格式字符串
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::auth(format!("no se pudo generar el hash: {}", e)))?;
    Ok(hash.to_string())
}

/// 校验密码与存储的 PHC 哈希是否匹配
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::auth(format!("hash inválido: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 从会话提取当前用户 id
pub fn current_user_id(login_id: &LoginIdExtractor) -> AppResult<i64> {
    login_id
        .0
        .parse::<i64>()
        .map_err(|_| AppError::auth("sesión inválida"))
}

/// 注册表单校验
fn validar_registro(req: &RegistroRequest) -> AppResult<()> {
    if !USERNAME_RE.is_match(&req.username) {
        return Err(AppError::validation(
            "username",
            "solo letras, números y @/./+/-/_, máximo 150 caracteres",
        ));
    }
    if req.password.len() < 8 {
        return Err(AppError::validation(
            "password",
            "la contraseña debe tener al menos 8 caracteres",
        ));
    }
    if req.password != req.password2 {
        return Err(AppError::validation(
            "password2",
            "las contraseñas no coinciden",
        ));
    }
    if !req.email.contains('@') {
        return Err(AppError::validation("email", "correo inválido"));
    }
    Ok(())
}

/// 登录成功后根据用户标志设置会话角色
/// Session roles derived from the user's staff/superuser flags
async fn asignar_roles(usuario: &crate::modules::usuarios::models::Usuario) {
    let mut roles = Vec::new();
    if usuario.is_staff {
        roles.push("admin".to_string());
    }
    if usuario.is_superuser {
        roles.push("superuser".to_string());
    }
    let _ = sa_token_core::StpUtil::set_roles(&usuario.id.to_string(), roles).await;
}

// ==================== 注册接口 ====================
// ==================== Registration Endpoint ====================

#[actix_web::post("/usuarios/registro")]
#[sa_ignore]
pub async fn registro(
    state: web::Data<SaTokenState>,
    pool: web::Data<PgPool>,
    req: web::Json<RegistroRequest>,
) -> Result<web::Json<ApiResponse<LoginResponse>>, AppError> {
    validar_registro(&req)?;

    let password_hash = hash_password(&req.password)?;
    let usuario = usuarios_repo::registrar(
        &pool,
        &req.username,
        &password_hash,
        &req.email,
        &req.first_name,
        &req.last_name,
    )
    .await
    .map_err(|e| match e {
        // 用户名唯一约束冲突换成表单错误
        AppError::Validation { .. } => AppError::validation("username", "el usuario ya existe"),
        other => other,
    })?;

    // 注册后自动登录
    let token = state
        .manager
        .login(&usuario.id.to_string())
        .await
        .map_err(|e| AppError::auth(format!("登录失败 / login failed: {}", e)))?;

    asignar_roles(&usuario).await;
    usuarios_repo::registrar_last_login(&pool, usuario.id).await?;

    tracing::info!("✅ 用户 {} 注册成功", usuario.username);

    let response = LoginResponse {
        token: token.to_string(),
        user_info: UserInfo {
            id: usuario.id,
            username: usuario.username,
            email: usuario.email,
            is_staff: usuario.is_staff,
            is_superuser: usuario.is_superuser,
        },
    };

    Ok(web::Json(ApiResponse::success(response)))
}

// ==================== 登录接口 ====================
// ==================== Login Endpoint ====================

#[actix_web::post("/usuarios/login")]
#[sa_ignore]
pub async fn login(
    state: web::Data<SaTokenState>,
    pool: web::Data<PgPool>,
    req: web::Json<LoginRequest>,
) -> Result<web::Json<ApiResponse<LoginResponse>>, AppError> {
    let usuario = match usuarios_repo::buscar_por_username(&pool, &req.username).await {
        Ok(u) => u,
        // 用户不存在与密码错误返回同一错误
        Err(AppError::NotFound { .. }) => {
            return Err(AppError::auth("usuario o contraseña incorrectos"))
        }
        Err(other) => return Err(other),
    };

    if !usuario.is_active {
        return Err(AppError::auth("la cuenta está desactivada"));
    }

    if !verify_password(&req.password, &usuario.password_hash)? {
        return Err(AppError::auth("usuario o contraseña incorrectos"));
    }

    // 生成token - 使用注入的 sa_token 状态
    // Generate token - using injected sa_token state
    let token = state
        .manager
        .login(&usuario.id.to_string())
        .await
        .map_err(|e| AppError::auth(format!("登录失败 / login failed: {}", e)))?;

    asignar_roles(&usuario).await;
    usuarios_repo::registrar_last_login(&pool, usuario.id).await?;

    tracing::info!(
        "✅ 用户 {} 登录成功 (staff: {}, superuser: {})",
        usuario.username,
        usuario.is_staff,
        usuario.is_superuser
    );

    let response = LoginResponse {
        token: token.to_string(),
        user_info: UserInfo {
            id: usuario.id,
            username: usuario.username,
            email: usuario.email,
            is_staff: usuario.is_staff,
            is_superuser: usuario.is_superuser,
        },
    };

    Ok(web::Json(ApiResponse::success(response)))
}

// ==================== 登出接口 ====================
// ==================== Logout Endpoint ====================

#[actix_web::post("/usuarios/logout")]
#[sa_check_login]
pub async fn logout(
    login_id: LoginIdExtractor,
) -> Result<web::Json<ApiResponse<serde_json::Value>>, AppError> {
    let _ = sa_token_core::StpUtil::kick_out(&login_id.0).await;

    Ok(web::Json(ApiResponse::success_msg(
        serde_json::json!({ "user_id": login_id.0 }),
        "sesión cerrada",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registro_valido() -> RegistroRequest {
        RegistroRequest {
            username: "maria.garcia".to_string(),
            password: "secreta123".to_string(),
            password2: "secreta123".to_string(),
            email: "maria@example.com".to_string(),
            first_name: "María".to_string(),
            last_name: "García".to_string(),
        }
    }

    #[test]
    fn test_hash_y_verify_password() {
        let hash = hash_password("secreta123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secreta123", &hash).unwrap());
        assert!(!verify_password("otra", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_hash_invalido() {
        assert!(verify_password("x", "no-es-un-hash").is_err());
    }

    #[test]
    fn test_validar_registro_ok() {
        assert!(validar_registro(&registro_valido()).is_ok());
    }

    #[test]
    fn test_validar_registro_password_corta() {
        let mut req = registro_valido();
        req.password = "corta".to_string();
        req.password2 = "corta".to_string();
        assert!(validar_registro(&req).is_err());
    }

    #[test]
    fn test_validar_registro_passwords_distintas() {
        let mut req = registro_valido();
        req.password2 = "distinta123".to_string();
        assert!(validar_registro(&req).is_err());
    }

    #[test]
    fn test_validar_registro_username_invalido() {
        let mut req = registro_valido();
        req.username = "maría garcía".to_string();
        assert!(validar_registro(&req).is_err());
    }
}
