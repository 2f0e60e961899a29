//! 日志配置
//!
//! 安装全局 tracing 订阅者；`RUST_LOG` 优先于配置的日志级别。

use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 重复调用是安全的，只有第一次生效。
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    if result.is_ok() {
        tracing::debug!("[Logger] 日志已初始化, level={}", default_level);
    }
}
