/// usuarios 模块
/// 账号、资料、收藏与私信
/// Accounts, profiles, favorites and private messages

pub mod controller;
pub mod models;
pub mod repo;
pub mod routes;

use crate::register_route;

/// 注册usuarios模块的路由
pub fn register_usuarios_routes() {
    register_route!(
        "usuarios",
        "账号、资料、收藏与私信",
        "usuarios",
        routes::configure
    );
}
