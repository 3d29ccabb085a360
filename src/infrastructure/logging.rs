//! 日志系统配置模块
//! 支持结构化日志、日志级别配置和文件输出

use std::path::Path;

use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::LoggingConfig;

/// 初始化日志系统
///
/// 启用文件日志时返回writer guard，调用方需持有它直到进程退出，
/// 否则缓冲中的日志会丢失
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    // 环境变量优先于配置的日志级别
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.enable_file_logging {
        let log_dir = config
            .log_file_path
            .as_ref()
            .and_then(|p| Path::new(p).parent().map(Path::to_path_buf))
            .unwrap_or_else(|| Path::new("./logs").to_path_buf());

        std::fs::create_dir_all(&log_dir)?;

        let file_appender = rolling::daily(&log_dir, "diboas-core.log");
        let (non_blocking_appender, guard) = non_blocking(file_appender);

        if config.format == "json" {
            let file_layer = fmt::layer().json().with_writer(non_blocking_appender);
            let stdout_layer = fmt::layer().json();
            Registry::default()
                .with(filter)
                .with(file_layer)
                .with(stdout_layer)
                .init();
        } else {
            let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking_appender);
            let stdout_layer = fmt::layer();
            Registry::default()
                .with(filter)
                .with(file_layer)
                .with(stdout_layer)
                .init();
        }
        return Ok(Some(guard));
    }

    if config.format == "json" {
        Registry::default()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        Registry::default().with(filter).with(fmt::layer()).init();
    }

    Ok(None)
}
