use config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置初始化失败: {message}")]
    InitializationError { message: String },

    #[error("配置项不存在: {key}")]
    KeyNotFound { key: String },

    #[error("配置解析失败: {key}: {message}")]
    ParseError { key: String, message: String },
}

/// 配置源定义
/// Configuration source definition
#[derive(Debug, Clone)]
pub enum ConfigSource {
    File {
        path: String,
        format: Option<FileFormat>,
        required: bool,
    },
    Env {
        prefix: String,
        separator: &'static str,
    },
}

/// 配置管理器：按声明顺序叠加配置源，后加载的覆盖先加载的
/// Configuration manager: sources are layered in order, later ones override earlier ones
pub struct ConfigManager {
    config: Config,
    sources: Vec<String>,
}

impl ConfigManager {
    /// 根据配置源列表创建配置管理器
    pub fn with_sources(sources: Vec<ConfigSource>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        let mut descriptions = Vec::new();

        for source in &sources {
            match source {
                ConfigSource::File {
                    path,
                    format,
                    required,
                } => {
                    let file = match format {
                        Some(fmt) => File::with_name(path).format(*fmt),
                        None => File::with_name(path),
                    };
                    builder = builder.add_source(file.required(*required));
                    descriptions.push(format!(
                        "file: {} ({})",
                        path,
                        if *required { "required" } else { "optional" }
                    ));
                }
                ConfigSource::Env { prefix, separator } => {
                    builder = builder
                        .add_source(Environment::with_prefix(prefix).separator(separator));
                    descriptions.push(format!("env: {}{}*", prefix, separator));
                }
            }
        }

        let config = builder
            .build()
            .map_err(|e| ConfigError::InitializationError {
                message: e.to_string(),
            })?;

        Ok(Self {
            config,
            sources: descriptions,
        })
    }

    /// 获取配置值
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        self.config.get::<T>(key).map_err(|e| match e {
            config::ConfigError::NotFound(_) => ConfigError::KeyNotFound {
                key: key.to_string(),
            },
            other => ConfigError::ParseError {
                key: key.to_string(),
                message: other.to_string(),
            },
        })
    }

    /// 获取字符串配置值
    pub fn get_string(&self, key: &str) -> Result<String, ConfigError> {
        self.get::<String>(key)
    }

    /// 获取配置值，不存在时返回默认值
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// 检查配置项是否存在
    pub fn exists(&self, key: &str) -> bool {
        self.config.get_string(key).is_ok()
            || self.config.get_bool(key).is_ok()
            || self.config.get_int(key).is_ok()
            || self.config.get_float(key).is_ok()
    }

    /// 打印配置源信息
    pub fn print_sources_info(&self) {
        tracing::info!("配置源 ({}):", self.sources.len());
        for source in &self.sources {
            tracing::info!("  - {}", source);
        }
    }
}

// 全局配置管理器单例
static GLOBAL_CONFIG_MANAGER: OnceLock<Arc<ConfigManager>> = OnceLock::new();

/// 获取全局配置管理器，首次调用时按当前环境初始化
/// Get the global configuration manager, initialized for the current environment on first call
pub fn get_global_config_manager() -> Result<Arc<ConfigManager>, ConfigError> {
    if let Some(manager) = GLOBAL_CONFIG_MANAGER.get() {
        return Ok(manager.clone());
    }

    let env_loader = crate::comm::config_validator::EnvironmentConfigLoader::new();
    let mut sources = Vec::new();

    for path in env_loader.get_config_paths() {
        sources.push(ConfigSource::File {
            path: path.clone(),
            format: Some(FileFormat::Toml),
            required: path.contains("default"),
        });
    }

    sources.push(ConfigSource::Env {
        prefix: "RECETAS".to_string(),
        separator: "_",
    });

    let manager = Arc::new(ConfigManager::with_sources(sources)?);
    Ok(GLOBAL_CONFIG_MANAGER.get_or_init(|| manager).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_source_overrides_nothing_when_unset() {
        let manager = ConfigManager::with_sources(vec![ConfigSource::Env {
            prefix: "RECETAS_TEST_UNSET".to_string(),
            separator: "_",
        }])
        .expect("env-only manager");
        assert!(manager.get_string("server.host").is_err());
        assert_eq!(manager.get_or("pagination.per_page", 12u32), 12);
    }

    #[test]
    fn test_missing_key_is_key_not_found() {
        let manager = ConfigManager::with_sources(vec![]).expect("empty manager");
        match manager.get_string("no.such.key") {
            Err(ConfigError::KeyNotFound { key }) => assert_eq!(key, "no.such.key"),
            other => panic!("se esperaba KeyNotFound, se obtuvo {:?}", other.err()),
        }
    }
}
