//! 日志基础设施

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

pub struct Logger;

impl Logger {
    /// 初始化日志系统
    ///
    /// `RUST_LOG` 优先于配置中的级别。配置了 `log_dir` 时额外按日期滚动写入文件，
    /// 返回的 guard 必须在进程生命周期内持有，否则文件日志会丢失。
    pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
        let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        let filter = build_filter(&config.level, rust_log.as_deref())?;

        let console_layer = config
            .console_output
            .then(|| fmt::layer().with_writer(std::io::stdout).with_ansi(true));

        let (file_layer, guard) = match &config.log_dir {
            Some(dir) => {
                let (writer, guard) = file_writer(dir, &config.file_prefix)?;
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false) // 文件中不使用颜色
                    .with_target(false)
                    .with_thread_names(true);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        Ok(guard)
    }
}

/// 有效的 `RUST_LOG` 覆盖配置级别，无法解析时退回配置级别
fn build_filter(level: &str, rust_log: Option<&str>) -> anyhow::Result<EnvFilter> {
    if let Some(directives) = rust_log {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return Ok(filter);
        }
    }
    Ok(EnvFilter::try_new(level)?)
}

/// 在 `dir` 下创建按日滚动的文件 `<prefix>.<YYYY-MM-DD>`
fn file_writer(dir: &Path, prefix: &str) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let file_appender = rolling::daily(dir, prefix);
    Ok(non_blocking(file_appender))
}
