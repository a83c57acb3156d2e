//! Tracing subscriber setup shared by the npmx binaries.
//!
//! Everything is driven by environment variables so deployments can switch
//! between human and JSON output without a rebuild:
//!
//! - `LOG_LEVEL` - default filter when `RUST_LOG` is unset (`info`)
//! - `LOG_FORMAT` - `human` or `json`
//! - `LOG_OUTPUT` - `console`, `file` or `both`
//! - `LOG_FILE_PATH` - file sink location, rotated daily

use std::{env, path::Path, path::PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{writer::BoxMakeWriter, writer::MakeWriterExt},
    prelude::*,
    registry, EnvFilter,
};

const DEFAULT_LOG_FILE: &str = "/tmp/npmx.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

/// Logging settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub output: LogOutput,
    pub format: LogFormat,
    pub file_path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Console,
            format: LogFormat::Human,
            file_path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl LogConfig {
    /// Read the `LOG_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let output = match lookup("LOG_OUTPUT").as_deref() {
            Some("file") => LogOutput::File,
            Some("both") => LogOutput::Both,
            Some("none") | Some("off") => LogOutput::Off,
            _ => LogOutput::Console,
        };

        let format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Human,
        };

        Self {
            level: lookup("LOG_LEVEL")
                .filter(|level| !level.trim().is_empty())
                .unwrap_or(defaults.level),
            output,
            format,
            file_path: lookup("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.file_path),
        }
    }
}

fn file_writer(path: &Path) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let log_dir = path.parent().unwrap_or_else(|| Path::new("/tmp"));
    let log_filename = path.file_name().unwrap_or("npmx.log".as_ref());
    let appender = tracing_appender::rolling::daily(log_dir, log_filename);
    tracing_appender::non_blocking(appender)
}

/// Install the global tracing subscriber.
///
/// The returned guard must be held for the lifetime of the process when a
/// file sink is active, otherwise buffered lines are dropped on exit.
pub fn init_subscriber(config: &LogConfig) -> Option<WorkerGuard> {
    let mut env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    for directive in ["hyper=warn", "reqwest=warn", "tokio=warn"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    let subscriber = registry().with(env_filter);

    let (writer, guard) = match config.output {
        LogOutput::Off => {
            subscriber.init();
            return None;
        }
        LogOutput::Console => (BoxMakeWriter::new(std::io::stdout), None),
        LogOutput::File => {
            let (non_blocking, guard) = file_writer(&config.file_path);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        LogOutput::Both => {
            let (non_blocking, guard) = file_writer(&config.file_path);
            (
                BoxMakeWriter::new(std::io::stdout.and(non_blocking)),
                Some(guard),
            )
        }
    };

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(writer);
    match config.format {
        LogFormat::Json => subscriber.with(fmt_layer.json()).init(),
        LogFormat::Human => subscriber.with(fmt_layer.pretty()).init(),
    }

    guard
}
