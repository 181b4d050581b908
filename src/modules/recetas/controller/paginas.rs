//! 静态页面接口：acerca de、contacto
//! Static page endpoints: about, contact

use actix_web::{web, HttpResponse, Responder, Result};
use sa_token_plugin_actix_web::sa_ignore;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ContactoRequest {
    pub nombre: String,
    pub email: String,
    pub asunto: String,
    pub mensaje: String,
}

fn validar_contacto(req: &ContactoRequest) -> Result<(), AppError> {
    if req.nombre.trim().is_empty() {
        return Err(AppError::validation("nombre", "el nombre es obligatorio"));
    }
    if !req.email.contains('@') {
        return Err(AppError::validation("email", "correo inválido"));
    }
    if req.mensaje.trim().is_empty() {
        return Err(AppError::validation("mensaje", "el mensaje es obligatorio"));
    }
    Ok(())
}

#[actix_web::get("/acerca-de")]
#[sa_ignore]
pub async fn acerca_de() -> Result<impl Responder> {
    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "nombre": "Blog de Recetas",
            "descripcion": "Comparte tus recetas, guarda tus favoritas y charla con otros cocineros.",
        }
    })))
}

/// 联系表单：校验后确认收到（不发送邮件）
#[actix_web::post("/contacto")]
#[sa_ignore]
pub async fn contacto(req: web::Json<ContactoRequest>) -> Result<impl Responder> {
    validar_contacto(&req)?;

    tracing::info!("mensaje de contacto recibido de {}", req.email);

    Ok(HttpResponse::Ok().json(json!({
        "code": 0,
        "message": "¡mensaje enviado con éxito! nos pondremos en contacto contigo pronto",
        "data": null
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contacto_valido() -> ContactoRequest {
        ContactoRequest {
            nombre: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            asunto: "Hola".to_string(),
            mensaje: "Me encanta el blog".to_string(),
        }
    }

    #[test]
    fn test_validar_contacto_ok() {
        assert!(validar_contacto(&contacto_valido()).is_ok());
    }

    #[test]
    fn test_validar_contacto_email_invalido() {
        let mut req = contacto_valido();
        req.email = "sin-arroba".to_string();
        assert!(validar_contacto(&req).is_err());
    }

    #[test]
    fn test_validar_contacto_mensaje_vacio() {
        let mut req = contacto_valido();
        req.mensaje = " ".to_string();
        assert!(validar_contacto(&req).is_err());
    }
}
