use std::net::TcpListener;

/// 同步检查端口是否可用
///
/// # 参数
/// * `port` - 要检查的端口号
///
/// # 返回值
/// * `bool` - 端口是否可用，true 表示可用，false 表示被占用
pub fn is_port_available_sync(port: u16) -> bool {
    TcpListener::bind(("0.0.0.0", port)).is_ok()
}

/// 查找可用端口（同步）
///
/// 从起始端口向上探测，最多探测 10 个端口，全部被占用时返回起始端口
///
/// # 参数
/// * `start_port` - 起始端口号
///
/// # 返回值
/// * `u16` - 找到的可用端口号
pub fn available_port(start_port: u16) -> u16 {
    let mut port = start_port;

    while port < start_port.saturating_add(10) {
        if is_port_available_sync(port) {
            if port != start_port {
                tracing::warn!("端口 {} 被占用，改用端口 {}", start_port, port);
            }
            return port;
        }
        port += 1;
    }

    start_port
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupied_port_is_detected() {
        let listener = TcpListener::bind(("0.0.0.0", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(!is_port_available_sync(port));
        drop(listener);
    }

    #[test]
    fn test_available_port_skips_occupied() {
        let listener = TcpListener::bind(("0.0.0.0", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        let found = available_port(port);
        assert_ne!(found, port);
        drop(listener);
    }
}
