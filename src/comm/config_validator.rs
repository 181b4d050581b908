use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfiguration {
    pub server_host: String,
    pub server_port: u16,
    pub server_workers: Option<usize>,
    pub server_debug: bool,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub logging_level: String,
    pub logging_json_format: bool,
    pub session_timeout_secs: u64,
    pub media_root: Option<String>,
    pub per_page: u32,
}

impl Default for AppConfiguration {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            server_workers: Some(4),
            server_debug: false,
            database_url: None,
            database_max_connections: Some(10),
            logging_level: "info".to_string(),
            logging_json_format: true,
            session_timeout_secs: 86400,
            media_root: None,
            per_page: 12,
        }
    }
}

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    /// 验证整个配置
    pub fn validate_config(&self, config: &AppConfiguration) -> AppResult<()> {
        // 验证服务器主机
        if config.server_host.is_empty() {
            return Err(AppError::validation("server_host", "服务器主机不能为空"));
        }

        // 验证端口范围
        if config.server_port < 1024 {
            return Err(AppError::validation(
                "server_port",
                "端口必须在1024-65535范围内",
            ));
        }

        // 验证工作线程数
        if let Some(workers) = config.server_workers {
            if workers == 0 || workers > 32 {
                return Err(AppError::validation(
                    "server_workers",
                    "工作线程数必须在1-32范围内",
                ));
            }
        }

        // 验证数据库连接池大小
        if let Some(max_conn) = config.database_max_connections {
            if max_conn == 0 || max_conn > 100 {
                return Err(AppError::validation(
                    "database_max_connections",
                    "数据库连接池大小必须在1-100范围内",
                ));
            }
        }

        // 验证日志级别
        let allowed_levels = ["trace", "debug", "info", "warn", "error"];
        if !allowed_levels.contains(&config.logging_level.as_str()) {
            return Err(AppError::validation("logging_level", "日志级别无效"));
        }

        // 验证会话有效期
        if config.session_timeout_secs < 300 || config.session_timeout_secs > 604800 {
            return Err(AppError::validation(
                "session_timeout_secs",
                "会话有效期必须在300-604800秒范围内",
            ));
        }

        // 验证分页大小
        if config.per_page == 0 || config.per_page > 100 {
            return Err(AppError::validation("per_page", "分页大小必须在1-100范围内"));
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// 环境配置加载器：根据 RECETAS_ENV 决定加载哪些配置文件
/// Environment loader: RECETAS_ENV decides which config files are layered
pub struct EnvironmentConfigLoader {
    environment: String,
}

impl EnvironmentConfigLoader {
    pub fn new() -> Self {
        let environment =
            std::env::var("RECETAS_ENV").unwrap_or_else(|_| "development".to_string());
        Self { environment }
    }

    /// 获取当前环境名称
    pub fn get_environment(&self) -> &str {
        &self.environment
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 获取配置文件路径列表（default 在前，环境覆盖在后）
    pub fn get_config_paths(&self) -> Vec<String> {
        vec![
            "config/config.default.toml".to_string(),
            format!("config/config.{}.toml", self.environment),
        ]
    }
}

impl Default for EnvironmentConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let validator = ConfigValidator::new();
        assert!(validator.validate_config(&AppConfiguration::default()).is_ok());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let validator = ConfigValidator::new();
        let config = AppConfiguration {
            server_port: 80,
            ..Default::default()
        };
        assert!(validator.validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_per_page_rejected() {
        let validator = ConfigValidator::new();
        let config = AppConfiguration {
            per_page: 0,
            ..Default::default()
        };
        assert!(validator.validate_config(&config).is_err());
    }

    #[test]
    fn test_config_paths_follow_environment() {
        std::env::set_var("RECETAS_ENV", "production");
        let loader = EnvironmentConfigLoader::new();
        let paths = loader.get_config_paths();
        assert_eq!(paths[0], "config/config.default.toml");
        assert_eq!(paths[1], "config/config.production.toml");
        assert!(loader.is_production());
        std::env::remove_var("RECETAS_ENV");
    }
}
