/// 通用通信模块
/// Common communication module

pub mod config;
pub mod config_validator;
pub mod enhanced_config;
pub mod my_listener;
pub mod pagination;
pub mod path;
pub mod port;
pub mod slug;

// 重新导出主要的公共接口
pub use my_listener::MyListener;
