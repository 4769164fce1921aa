use super::config::{LogConfig, LogFormat, RotationPolicy};
use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Holds the non-blocking writer guard alive for the life of the process;
/// dropping it flushes buffered log lines.
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    pub fn init(config: &LogConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let env_filter = EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

        let guard = if let Some(ref log_dir) = config.log_dir {
            let file_appender = match config.rotation {
                RotationPolicy::Daily => rolling::daily(log_dir, "opsbrain-engine.log"),
                RotationPolicy::Hourly => rolling::hourly(log_dir, "opsbrain-engine.log"),
                RotationPolicy::Never => rolling::never(log_dir, "opsbrain-engine.log"),
            };
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_target(true)
                .with_filter(env_filter.clone());

            if config.enable_stdout {
                tracing_subscriber::registry().with(file_layer).with(stdout_layer(config.format, env_filter)).init();
            } else {
                tracing_subscriber::registry().with(file_layer).init();
            }
            Some(guard)
        } else {
            tracing_subscriber::registry().with(stdout_layer(config.format, env_filter)).init();
            None
        };

        tracing::info!(level = %config.level, format = ?config.format, file_output = config.log_dir.is_some(), "logger initialized");
        Ok(Self { _guard: guard })
    }
}

fn stdout_layer<S>(format: LogFormat, env_filter: EnvFilter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stdout)
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(io::stdout)
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("invalid log level: {level}"),
    }
}

pub use tracing::{debug, error, info, instrument, trace, warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("WARN"), Ok(Level::WARN)));
        assert!(parse_log_level("verbose").is_err());
    }
}
