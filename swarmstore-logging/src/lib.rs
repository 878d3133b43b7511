// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Tracing setup for every crate in the workspace. Nothing outside the CLI
//! binary's direct user-facing output should use `println!`/`eprintln!`;
//! everything else goes through `tracing`.

pub mod error;
pub mod markers;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Once;

pub use error::{Error, Result};
pub use markers::Marker;

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_core::Level;
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

/// Crate names this workspace logs from. `"all"` expands to every one of
/// these at `TRACE`.
const ALL_SWARMSTORE_LOGS: &[&str] = &[
    "swarmstore_protocol",
    "swarmstore_networking",
    "swarmstore_logging",
    "swarmstore_node",
];

/// Environment variable overriding per-crate level filters, parsed the same
/// way as a `RUST_LOG`-style directive string (`crate=level,crate=level`),
/// with the bare value `"all"` as a shortcut for every workspace crate at
/// `TRACE`.
pub const LOG_ENV_VAR: &str = "SWARMSTORE_LOG";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Default,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Default => write!(f, "default"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_log_format(s)
    }
}

pub fn parse_log_format(val: &str) -> Result<LogFormat> {
    match val {
        "default" => Ok(LogFormat::Default),
        "json" => Ok(LogFormat::Json),
        other => Err(Error::LoggingConfiguration(format!(
            "unknown log format: {other:?}, expected \"default\" or \"json\""
        ))),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogOutputDest {
    Stdout,
    Path(PathBuf),
}

impl fmt::Display for LogOutputDest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogOutputDest::Stdout => write!(f, "stdout"),
            LogOutputDest::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolve the effective per-crate level table: the caller's defaults,
/// overridden by `SWARMSTORE_LOG` if set.
fn get_logging_targets(defaults: &[(String, Level)]) -> Vec<(String, Level)> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(value) if value.eq_ignore_ascii_case("all") => ALL_SWARMSTORE_LOGS
            .iter()
            .map(|name| (name.to_string(), Level::TRACE))
            .collect(),
        Ok(value) => value
            .split(',')
            .filter_map(|directive| {
                let (target, level) = directive.split_once('=')?;
                let level = get_log_level_from_str(level.trim())?;
                Some((target.trim().to_string(), level))
            })
            .collect(),
        Err(_) => defaults.to_vec(),
    }
}

fn get_log_level_from_str(level: &str) -> Option<Level> {
    match level.to_ascii_uppercase().as_str() {
        "TRACE" => Some(Level::TRACE),
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARN" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        _ => None,
    }
}

fn env_filter_for(targets: &[(String, Level)]) -> EnvFilter {
    let directives = targets
        .iter()
        .map(|(target, level)| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::try_new(if directives.is_empty() { "info" } else { &directives })
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 512MiB per rotated file, keeping the 5 most recent rotations, matching
/// the teacher logging crate's own default budget for a long-running node.
const MAX_LOG_FILE_BYTES: usize = 512 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

/// Initialise the global tracing subscriber for the process. Returns the
/// `WorkerGuard` the caller must keep alive for non-blocking writes to
/// flush on shutdown; dropping it early silently truncates the remaining
/// log buffer.
pub fn init_logging(
    default_logging_targets: Vec<(String, Level)>,
    output_dest: LogOutputDest,
    format: LogFormat,
) -> Result<Option<WorkerGuard>> {
    let targets = get_logging_targets(&default_logging_targets);
    let filter = env_filter_for(&targets);

    let (non_blocking, guard) = match &output_dest {
        LogOutputDest::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutputDest::Path(dir) => {
            std::fs::create_dir_all(dir)?;
            let rotater = FileRotate::new(
                dir.join("swarmstore.log"),
                AppendCount::new(MAX_LOG_FILES),
                ContentLimit::Bytes(MAX_LOG_FILE_BYTES),
                Compression::None,
                None,
            );
            tracing_appender::non_blocking(rotater)
        }
    };

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Default => {
            let layer = tracing_fmt::layer()
                .with_target(true)
                .with_ansi(matches!(output_dest, LogOutputDest::Stdout))
                .with_writer(non_blocking);
            registry.with(layer).init();
        }
        LogFormat::Json => {
            let layer = tracing_fmt::layer().json().with_writer(non_blocking);
            registry.with(layer).init();
        }
    }

    Ok(Some(guard))
}

static TEST_LOGGER: Once = Once::new();

/// Initialise a stdout subscriber once per process, for use from
/// `#[cfg(test)]` modules across the workspace.
pub fn init_test_logger() {
    TEST_LOGGER.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats() {
        assert_eq!(parse_log_format("default").unwrap(), LogFormat::Default);
        assert_eq!(parse_log_format("json").unwrap(), LogFormat::Json);
        assert!(parse_log_format("yaml").is_err());
    }

    #[test]
    fn all_shortcut_expands_every_crate() {
        std::env::set_var(LOG_ENV_VAR, "all");
        let targets = get_logging_targets(&[]);
        std::env::remove_var(LOG_ENV_VAR);
        assert_eq!(targets.len(), ALL_SWARMSTORE_LOGS.len());
        assert!(targets.iter().all(|(_, level)| *level == Level::TRACE));
    }
}
