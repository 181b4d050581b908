/// recetas 模块
/// 菜谱、分类、评论、搜索与管理面板
/// Recipes, categories, comments, search and the admin panel

pub mod controller;
pub mod models;
pub mod repo;
pub mod routes;

use crate::register_route;

/// 注册recetas模块的路由
pub fn register_recetas_routes() {
    register_route!(
        "recetas",
        "菜谱、分类、评论、搜索与管理面板",
        "recetas",
        routes::configure
    );
}
