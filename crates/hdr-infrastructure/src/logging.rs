//! Process-wide tracing setup for the router
//!
//! One subscriber per process: a stdout layer, plus a daily-rotated file
//! layer when `logging.file_output` is set. `HDR_LOG` overrides the
//! configured level with full filter directives, for example
//! `hdr_infrastructure::routing=trace`.

use std::path::Path;

use hdr_domain::error::{Error, Result};
use tracing::level_filters::LevelFilter;
use tracing::{Level, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

pub use crate::config::LoggingConfig;
use crate::constants::{LOG_ENV_FILTER, LOG_FILE_STEM};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber described by `config`.
///
/// Fails if the level is unknown or a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .with_env_var(LOG_ENV_FILTER)
        .from_env_lossy();

    let mut layers = vec![stdout_layer(config.json_format)];
    if let Some(path) = &config.file_output {
        layers.push(file_layer(path, config.json_format));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| Error::configuration_with_source("Failed to install logger", e))?;
    info!(
        level = %level,
        json = config.json_format,
        file = ?config.file_output,
        "Logging initialized"
    );
    Ok(())
}

fn stdout_layer(json: bool) -> BoxedLayer {
    let layer = fmt::layer().with_target(true).with_thread_ids(true);
    if json {
        layer.json().with_file(true).with_line_number(true).boxed()
    } else {
        layer.boxed()
    }
}

/// Rotates daily next to `path`, named after its stem
fn file_layer(path: &Path, json: bool) -> BoxedLayer {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let stem = path
        .file_stem()
        .map_or_else(|| LOG_FILE_STEM.into(), |s| s.to_string_lossy().into_owned());
    let appender = tracing_appender::rolling::daily(dir, stem);
    let layer = fmt::layer().with_writer(appender).with_ansi(false);
    if json { layer.json().boxed() } else { layer.boxed() }
}

/// Parse a level name, case-insensitive; `warning` is accepted for `warn`
pub fn parse_log_level(level: &str) -> Result<Level> {
    let name = level.trim().to_ascii_lowercase();
    let name = if name == "warning" { "warn" } else { name.as_str() };
    name.parse::<Level>().map_err(|_| {
        Error::configuration(format!(
            "unknown log level `{level}`, expected trace, debug, info, warn or error"
        ))
    })
}

/// Report whether the configuration file was found
pub fn log_config_loaded(config_path: &Path, success: bool) {
    if success {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        warn!(path = %config_path.display(), "Configuration file not found, using defaults");
    }
}
