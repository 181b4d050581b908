use actix_web::web;

use super::controller::{favoritos, mensajes, perfil};
use crate::auth;

/// usuarios 模块的路由配置
/// /usuarios/mensajes/no-leidos 必须先于 /usuarios/mensajes/{username} 注册
/// The fixed messages path must be registered before the {username} one
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::registro)
        .service(auth::login)
        .service(auth::logout)
        .service(perfil::ver)
        .service(perfil::editar)
        .service(perfil::seguridad)
        .service(perfil::mis_comentarios)
        .service(favoritos::listar)
        .service(favoritos::crear_categoria)
        .service(favoritos::renombrar_categoria)
        .service(favoritos::eliminar_categoria)
        .service(favoritos::toggle_favorito)
        .service(favoritos::add_to_category)
        .service(mensajes::inbox)
        .service(mensajes::no_leidos)
        .service(mensajes::conversacion)
        .service(mensajes::enviar);
}
