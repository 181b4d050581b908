use async_trait::async_trait;
use sa_token_core::SaTokenListener;

/// 会话事件监听器：登录、登出、踢出
pub struct MyListener;

#[async_trait]
impl SaTokenListener for MyListener {
    async fn on_login(&self, login_id: &str, _token: &str, _login_type: &str) {
        tracing::info!("用户 {} 登录了", login_id);
    }

    async fn on_logout(&self, login_id: &str, _token: &str, _login_type: &str) {
        tracing::info!("用户 {} 登出了", login_id);
    }

    async fn on_kick_out(&self, login_id: &str, _token: &str, _login_type: &str) {
        tracing::info!("用户 {} 被踢下线了", login_id);
    }
}
