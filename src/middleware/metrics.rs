use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    future::{ready, Ready},
    rc::Rc,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, RwLock,
    },
    time::Instant,
};
use utoipa::ToSchema;

/// 性能指标数据结构
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PerformanceMetrics {
    /// 请求总数
    pub total_requests: u64,
    /// 成功请求数
    pub successful_requests: u64,
    /// 失败请求数
    pub failed_requests: u64,
    /// 平均响应时间（毫秒）
    pub avg_response_time_ms: f64,
    /// 最大响应时间（毫秒）
    pub max_response_time_ms: u64,
    /// 每秒请求数（QPS）
    pub requests_per_second: f64,
    /// 按状态码分组的请求数
    pub status_code_counts: HashMap<u16, u64>,
    /// 按路径分组的请求数
    pub path_counts: HashMap<String, u64>,
    /// 内存使用情况（字节）
    pub memory_usage_bytes: u64,
    /// CPU 使用率（百分比）
    pub cpu_usage_percent: f64,
}

/// 请求记录
#[derive(Debug)]
pub struct RequestRecord {
    start_time: Instant,
    path: String,
    method: String,
}

/// 环形缓冲区，用于存储响应时间历史
#[derive(Debug)]
struct RingBuffer {
    buffer: Vec<u64>,
    capacity: usize,
    head: usize,
    size: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            capacity,
            head: 0,
            size: 0,
        }
    }

    fn push(&mut self, value: u64) {
        self.buffer[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        if self.size < self.capacity {
            self.size += 1;
        }
    }

    fn average(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        let sum: u64 = self.buffer.iter().take(self.size).sum();
        sum as f64 / self.size as f64
    }

    fn clear(&mut self) {
        self.head = 0;
        self.size = 0;
    }
}

/// 性能监控器：原子计数器 + 响应时间环形缓冲
pub struct PerformanceMonitor {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    max_response_time_ms: AtomicU64,
    response_times: Mutex<RingBuffer>,
    status_code_counts: RwLock<HashMap<u16, u64>>,
    path_counts: RwLock<HashMap<String, u64>>,
    started_at: Instant,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            max_response_time_ms: AtomicU64::new(0),
            response_times: Mutex::new(RingBuffer::new(1024)),
            status_code_counts: RwLock::new(HashMap::new()),
            path_counts: RwLock::new(HashMap::new()),
            started_at: Instant::now(),
        }
    }

    /// 记录请求开始
    pub fn record_request_start(&self, path: &str, method: &str) -> RequestRecord {
        RequestRecord {
            start_time: Instant::now(),
            path: path.to_string(),
            method: method.to_string(),
        }
    }

    /// 记录请求结束
    pub fn record_request_end(&self, record: RequestRecord, status_code: u16) {
        let elapsed_ms = record.start_time.elapsed().as_millis() as u64;

        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if status_code < 400 {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }

        self.max_response_time_ms
            .fetch_max(elapsed_ms, Ordering::Relaxed);

        if let Ok(mut times) = self.response_times.lock() {
            times.push(elapsed_ms);
        }

        if let Ok(mut codes) = self.status_code_counts.write() {
            *codes.entry(status_code).or_insert(0) += 1;
        }

        if let Ok(mut paths) = self.path_counts.write() {
            let key = format!("{} {}", record.method, record.path);
            *paths.entry(key).or_insert(0) += 1;
        }
    }

    /// 当前指标快照
    pub fn get_metrics(&self) -> PerformanceMetrics {
        let total = self.total_requests.load(Ordering::Relaxed);
        let elapsed_secs = self.started_at.elapsed().as_secs_f64();

        let avg = self
            .response_times
            .lock()
            .map(|times| times.average())
            .unwrap_or(0.0);

        let memory_usage_bytes = sys_info::mem_info()
            .map(|m| m.total.saturating_sub(m.avail) * 1024)
            .unwrap_or(0);
        let cpu_usage_percent = match (sys_info::loadavg(), sys_info::cpu_num()) {
            (Ok(load), Ok(cpus)) if cpus > 0 => load.one / cpus as f64 * 100.0,
            _ => 0.0,
        };

        PerformanceMetrics {
            total_requests: total,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            avg_response_time_ms: avg,
            max_response_time_ms: self.max_response_time_ms.load(Ordering::Relaxed),
            requests_per_second: if elapsed_secs > 0.0 {
                total as f64 / elapsed_secs
            } else {
                0.0
            },
            status_code_counts: self
                .status_code_counts
                .read()
                .map(|c| c.clone())
                .unwrap_or_default(),
            path_counts: self.path_counts.read().map(|p| p.clone()).unwrap_or_default(),
            memory_usage_bytes,
            cpu_usage_percent,
        }
    }

    /// 生成可读的性能报告
    pub fn generate_report(&self) -> String {
        let metrics = self.get_metrics();
        let success_rate = if metrics.total_requests > 0 {
            metrics.successful_requests as f64 / metrics.total_requests as f64 * 100.0
        } else {
            100.0
        };

        format!(
            "请求总数: {}\n成功率: {:.2}%\n平均响应时间: {:.2}ms\n最大响应时间: {}ms\nQPS: {:.2}",
            metrics.total_requests,
            success_rate,
            metrics.avg_response_time_ms,
            metrics.max_response_time_ms,
            metrics.requests_per_second,
        )
    }

    /// 重置指标
    pub fn reset_metrics(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.successful_requests.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
        self.max_response_time_ms.store(0, Ordering::Relaxed);
        if let Ok(mut times) = self.response_times.lock() {
            times.clear();
        }
        if let Ok(mut codes) = self.status_code_counts.write() {
            codes.clear();
        }
        if let Ok(mut paths) = self.path_counts.write() {
            paths.clear();
        }
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// 请求指标中间件
pub struct MetricsMiddleware {
    monitor: Arc<PerformanceMonitor>,
}

impl MetricsMiddleware {
    pub fn new(monitor: Arc<PerformanceMonitor>) -> Self {
        Self { monitor }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = MetricsMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
            monitor: self.monitor.clone(),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
    monitor: Arc<PerformanceMonitor>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let monitor = self.monitor.clone();
        let record = monitor.record_request_start(req.path(), req.method().as_str());

        Box::pin(async move {
            let res = service.call(req).await?;
            monitor.record_request_end(record, res.status().as_u16());
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_average() {
        let mut buffer = RingBuffer::new(3);
        assert_eq!(buffer.average(), 0.0);
        buffer.push(10);
        buffer.push(20);
        assert_eq!(buffer.average(), 15.0);
        // 超过容量时覆盖最旧的值
        buffer.push(30);
        buffer.push(40);
        assert_eq!(buffer.average(), 30.0);
    }

    #[test]
    fn test_monitor_counts_requests() {
        let monitor = PerformanceMonitor::new();

        let record = monitor.record_request_start("/recetas", "GET");
        monitor.record_request_end(record, 200);
        let record = monitor.record_request_start("/recetas", "GET");
        monitor.record_request_end(record, 404);

        let metrics = monitor.get_metrics();
        assert_eq!(metrics.total_requests, 2);
        assert_eq!(metrics.successful_requests, 1);
        assert_eq!(metrics.failed_requests, 1);
        assert_eq!(metrics.status_code_counts.get(&404), Some(&1));
        assert_eq!(metrics.path_counts.get("GET /recetas"), Some(&2));
    }

    #[test]
    fn test_monitor_reset() {
        let monitor = PerformanceMonitor::new();
        let record = monitor.record_request_start("/recetas", "GET");
        monitor.record_request_end(record, 200);

        monitor.reset_metrics();
        let metrics = monitor.get_metrics();
        assert_eq!(metrics.total_requests, 0);
        assert!(metrics.status_code_counts.is_empty());
    }
}
