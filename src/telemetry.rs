//! 结构化日志初始化

use crate::config::AppConfig;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// 安装全局 subscriber。`RUST_LOG` 存在时覆盖 `logging.level`。
///
/// 只能调用一次；重复调用会 panic（tracing-subscriber 的全局约束）。
pub fn init_telemetry(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let fmt = tracing_subscriber::fmt::layer().with_target(false);
    let layer = match config.logging.format.to_lowercase().as_str() {
        "json" => fmt
            .json()
            .with_current_span(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        "pretty" => fmt.pretty().boxed(),
        _ => fmt.compact().boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();

    tracing::info!(
        level = %config.logging.level,
        format = %config.logging.format,
        backend = ?config.storage.backend,
        "Logging initialized"
    );
}
