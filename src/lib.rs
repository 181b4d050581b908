pub mod auth;
pub mod error;
pub mod middleware;
pub mod api;
#[path = "bootstrap/app_bootstrap.rs"]
pub mod app_bootstrap;
#[path = "bootstrap/command_registry.rs"]
pub mod command_registry;
#[path = "bootstrap/route_registry.rs"]
pub mod route_registry;
pub mod cmd {
    #[path = "../cmd/routes.rs"]
    pub mod routes;
    #[path = "../cmd/version.rs"]
    pub mod version;
    pub use routes::*;
    pub use version::*;
}
pub mod comm;
pub mod conf;
pub mod db;

// Modules
pub mod modules;

/// 初始化所有模块的命令
pub fn init_commands() {
    command_registry::register_command_module(Box::new(cmd::routes::RoutesCommand));
}

/// 初始化所有模块的路由
pub fn init_routes() {
    // 注册recetas模块的路由
    modules::recetas::register_recetas_routes();

    // 注册usuarios模块的路由
    modules::usuarios::register_usuarios_routes();
}

// Re-export bootstrap modules
pub use app_bootstrap::*;
pub use command_registry::*;
pub use route_registry::*;
