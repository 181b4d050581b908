//! 数据库连接池初始化与迁移
//! Database pool construction and migrations

use crate::comm::config_validator::AppConfiguration;
use crate::error::{AppError, AppResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

/// 创建 PostgreSQL 连接池并执行待应用的迁移
pub async fn init_pool(config: &AppConfiguration) -> AppResult<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::database("database.url 未配置"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections.unwrap_or(10))
        .acquire_timeout(Duration::from_secs(10))
        .connect(url)
        .await
        .map_err(|e| AppError::database(format!("连接数据库失败: {}", e)))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::database(format!("执行迁移失败: {}", e)))?;

    info!("数据库连接池初始化完成");
    Ok(pool)
}
