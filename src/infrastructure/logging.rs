//! Logging system configuration and initialization
//!
//! - Console and file output, each optional
//! - Optional JSON formatting for the file output
//! - Log files stored next to the executable
//! - JST (Japan Standard Time) timestamps
//!
//! `RUST_LOG` takes precedence over the configured level when set.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::{FixedOffset, Utc};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Subscriber, info};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

// Keeps the non-blocking file writers alive for the lifetime of the process
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<WorkerGuard>> = Mutex::new(Vec::new());
}

const JST_OFFSET_SECONDS: i32 = 9 * 3600;

/// Dependencies that are capped unless tracing is requested
const NOISY_TARGETS: &[(&str, &str)] = &[
    ("reqwest", "info"),
    ("hyper", "warn"),
    ("hyper_util", "warn"),
    ("h2", "warn"),
    ("html5ever", "warn"),
    ("selectors", "warn"),
];

/// Timestamps in Japan Standard Time (UTC+9)
struct JstTimeFormatter;

impl FormatTime for JstTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let Some(jst) = FixedOffset::east_opt(JST_OFFSET_SECONDS) else {
            return Err(std::fmt::Error);
        };
        write!(w, "{}", Utc::now().with_timezone(&jst).format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Build the level filter for `config`.
///
/// Outside of TRACE, HTTP and HTML parser internals are capped so that the
/// search node's own events stay readable.
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    if !config.level.to_lowercase().contains("trace") {
        for (target, level) in NOISY_TARGETS {
            filter = filter.add_directive(format!("{target}={level}").parse()?);
        }
    }

    for (module, level) in &config.module_filters {
        filter = filter.add_directive(
            format!("{module}={level}")
                .parse()
                .map_err(|e| anyhow!("Invalid filter for module '{}': {}", module, e))?,
        );
    }

    Ok(filter)
}

type FilteredRegistry = Layered<EnvFilter, Registry>;
type FileLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Assemble the subscriber for `config`, writing log files under `log_dir`.
///
/// The returned guard must outlive the subscriber or buffered file output is
/// lost.
pub fn build_subscriber(
    config: &LoggingConfig,
    log_dir: &Path,
) -> Result<(Box<dyn Subscriber + Send + Sync>, Option<WorkerGuard>)> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let env_filter = build_env_filter(config)?;

    let (file_layer, file_guard) = if config.file_output {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        let file_appender = rolling::never(log_dir, &config.file_name);
        let (file_writer, guard) = non_blocking(file_appender);

        let layer: FileLayer = if config.json_format {
            fmt::Layer::new()
                .json()
                .with_writer(file_writer)
                .with_timer(JstTimeFormatter)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .boxed()
        } else {
            fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(JstTimeFormatter)
                .with_target(false)
                .with_ansi(false)
                .boxed()
        };
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_timer(JstTimeFormatter)
            .with_target(false)
    });

    let subscriber: Box<dyn Subscriber + Send + Sync> = Box::new(
        Registry::default()
            .with(env_filter)
            .with(file_layer)
            .with(console_layer),
    );

    Ok((subscriber, file_guard))
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let log_dir = get_log_directory();
    let (subscriber, file_guard) = build_subscriber(config, &log_dir)?;

    if let Some(guard) = file_guard {
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(guard);
    }
    subscriber.try_init()?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!("Log file: {:?}", log_dir.join(&config.file_name));
    }

    Ok(())
}
