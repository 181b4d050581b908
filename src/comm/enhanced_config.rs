use crate::comm::config::{get_global_config_manager, ConfigManager};
use crate::comm::config_validator::{AppConfiguration, ConfigValidator, EnvironmentConfigLoader};
use crate::error::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, info};

/// 增强的配置管理器：叠加配置源 + 验证 + 摘要输出
pub struct EnhancedConfigManager {
    config_manager: Arc<ConfigManager>,
    env_loader: EnvironmentConfigLoader,
    app_config: AppConfiguration,
}

impl EnhancedConfigManager {
    /// 创建增强的配置管理器
    pub async fn new() -> AppResult<Self> {
        let env_loader = EnvironmentConfigLoader::new();
        info!("当前环境: {}", env_loader.get_environment());

        let config_manager = get_global_config_manager().map_err(AppError::Config)?;

        let validator = ConfigValidator::new();
        let app_config = Self::load_app_config(&config_manager, &validator)?;

        Ok(Self {
            config_manager,
            env_loader,
            app_config,
        })
    }

    /// 从配置管理器加载应用配置
    fn load_app_config(
        config_manager: &ConfigManager,
        validator: &ConfigValidator,
    ) -> AppResult<AppConfiguration> {
        let mut app_config = AppConfiguration::default();

        if let Ok(host) = config_manager.get_string("server.host") {
            app_config.server_host = host;
        }

        if let Ok(port) = config_manager.get::<u16>("server.port") {
            app_config.server_port = port;
        }

        if let Ok(workers) = config_manager.get::<usize>("server.workers") {
            app_config.server_workers = Some(workers);
        }

        if let Ok(debug_mode) = config_manager.get::<bool>("server.debug") {
            app_config.server_debug = debug_mode;
        }

        if let Ok(db_url) = config_manager.get_string("database.url") {
            app_config.database_url = Some(db_url);
        }

        if let Ok(max_conn) = config_manager.get::<u32>("database.max_connections") {
            app_config.database_max_connections = Some(max_conn);
        }

        if let Ok(level) = config_manager.get_string("logging.level") {
            app_config.logging_level = level;
        }

        if let Ok(json_format) = config_manager.get::<bool>("logging.json_format") {
            app_config.logging_json_format = json_format;
        }

        if let Ok(timeout) = config_manager.get::<u64>("session.timeout") {
            app_config.session_timeout_secs = timeout;
        }

        if let Ok(root) = config_manager.get_string("media.root") {
            if !root.is_empty() {
                app_config.media_root = Some(root);
            }
        }

        if let Ok(per_page) = config_manager.get::<u32>("pagination.per_page") {
            app_config.per_page = per_page;
        }

        // 验证配置
        validator.validate_config(&app_config)?;

        info!("配置加载和验证成功");
        debug!("应用配置: {:?}", app_config);

        Ok(app_config)
    }

    /// 获取应用配置
    pub fn get_app_config(&self) -> &AppConfiguration {
        &self.app_config
    }

    /// 获取原始配置管理器
    pub fn get_config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    /// 验证必需的配置项
    pub fn validate_required_config(&self) -> AppResult<()> {
        let required_keys = if self.env_loader.is_production() {
            vec![
                "server.host",
                "server.port",
                "database.url",
                "logging.level",
            ]
        } else {
            vec!["server.host", "server.port", "logging.level"]
        };

        for key in required_keys {
            if !self.config_manager.exists(key) {
                return Err(AppError::Config(
                    crate::comm::config::ConfigError::KeyNotFound {
                        key: key.to_string(),
                    },
                ));
            }
        }

        Ok(())
    }

    /// 打印配置摘要
    pub fn print_config_summary(&self) {
        info!("=== 配置摘要 ===");
        info!("环境: {}", self.env_loader.get_environment());
        info!(
            "服务器: {}:{}",
            self.app_config.server_host, self.app_config.server_port
        );
        info!("工作线程: {:?}", self.app_config.server_workers);
        info!("调试模式: {}", self.app_config.server_debug);
        info!("日志级别: {}", self.app_config.logging_level);
        info!("JSON日志: {}", self.app_config.logging_json_format);
        info!("会话有效期: {} 秒", self.app_config.session_timeout_secs);
        info!("分页大小: {}", self.app_config.per_page);

        if let Some(db_url) = &self.app_config.database_url {
            info!("数据库: {}", Self::mask_sensitive_info(db_url));
        }

        self.config_manager.print_sources_info();
    }

    /// 屏蔽敏感信息（连接串中的密码）
    fn mask_sensitive_info(url: &str) -> String {
        if let Some(start) = url.find("://") {
            if let Some(at_pos) = url[start + 3..].find('@') {
                let mut result = url.to_string();
                let password_start = start + 3;
                let password_end = password_start + at_pos;

                if let Some(colon_pos) = url[password_start..password_end].find(':') {
                    let actual_colon_pos = password_start + colon_pos + 1;
                    result.replace_range(actual_colon_pos..password_end, "***");
                }
                result
            } else {
                url.to_string()
            }
        } else {
            url.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_sensitive_info() {
        let masked =
            EnhancedConfigManager::mask_sensitive_info("postgres://recetas:secreta@db:5432/blog");
        assert_eq!(masked, "postgres://recetas:***@db:5432/blog");

        // 无密码的连接串保持不变
        let plain = EnhancedConfigManager::mask_sensitive_info("postgres://db:5432/blog");
        assert_eq!(plain, "postgres://db:5432/blog");
    }
}
