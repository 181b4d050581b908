/// API 基础接口：指标、健康检查与文档
pub mod metrics;
pub mod swagger;
