// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! A `Logger` implementation for the `log` facade with per-component filtering.

use std::{
    collections::HashMap,
    io::Write,
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use helm_core::{datetime::unix_nanos_to_iso8601_millis, time::get_atomic_clock_realtime};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::{Deserialize, Serialize};
use ustr::Ustr;

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Configuration for `Logger` instances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// The minimum level for the stdout writer.
    pub stdout_level: String,
    /// Per-component level overrides, keyed by module path prefix.
    pub component_levels: HashMap<String, String>,
    /// If timestamps are printed as ISO 8601 strings (else UNIX nanoseconds).
    pub print_timestamps_iso8601: bool,
    /// If ANSI colors are used for the level field.
    pub print_colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            stdout_level: "INFO".to_string(),
            component_levels: HashMap::new(),
            print_timestamps_iso8601: true,
            print_colors: true,
        }
    }
}

impl LoggerConfig {
    fn stdout_level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.stdout_level).unwrap_or(LevelFilter::Info)
    }
}

/// A logger for the `log` crate facade writing to stdout/stderr.
///
/// Errors and warnings go to stderr, everything else to stdout.
#[derive(Debug)]
pub struct Logger {
    config: LoggerConfig,
    stdout_level: LevelFilter,
    component_levels: HashMap<Ustr, LevelFilter>,
}

impl Logger {
    /// Creates a new [`Logger`] instance from the given config.
    #[must_use]
    pub fn new(config: LoggerConfig) -> Self {
        let stdout_level = config.stdout_level_filter();
        let component_levels = config
            .component_levels
            .iter()
            .map(|(component, level)| {
                (
                    Ustr::from(component),
                    LevelFilter::from_str(level).unwrap_or(stdout_level),
                )
            })
            .collect();

        Self {
            config,
            stdout_level,
            component_levels,
        }
    }

    fn level_for(&self, target: &str) -> LevelFilter {
        for (component, level) in &self.component_levels {
            if target.starts_with(component.as_str()) {
                return *level;
            }
        }
        self.stdout_level
    }

    fn format_line(&self, record: &Record<'_>) -> String {
        let ts = get_atomic_clock_realtime().get_time_ns();
        let timestamp = if self.config.print_timestamps_iso8601 {
            unix_nanos_to_iso8601_millis(ts)
        } else {
            ts.to_string()
        };

        let level = if self.config.print_colors {
            match record.level() {
                Level::Error => "\x1b[31mERROR\x1b[0m",
                Level::Warn => "\x1b[33m WARN\x1b[0m",
                Level::Info => " INFO",
                Level::Debug => "DEBUG",
                Level::Trace => "TRACE",
            }
            .to_string()
        } else {
            format!("{:>5}", record.level())
        };

        format!(
            "{} [{}] {}: {}",
            timestamp,
            level,
            record.target(),
            record.args(),
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format_line(record);
        if record.level() <= Level::Warn {
            let _ = writeln!(std::io::stderr(), "{line}");
        } else {
            let _ = writeln!(std::io::stdout(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }
}

/// Initializes global logging from the given config.
///
/// Subsequent calls are no-ops (the first initialization wins).
///
/// # Errors
///
/// Returns an error if a conflicting global logger was already set outside
/// this function.
pub fn init_logging(config: LoggerConfig) -> anyhow::Result<()> {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let logger = Logger::new(config);
    let max_level = logger
        .component_levels
        .values()
        .copied()
        .chain(std::iter::once(logger.stdout_level))
        .max()
        .unwrap_or(LevelFilter::Info);

    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| anyhow::anyhow!("Failed to set logger: {e}"))?;
    log::set_max_level(max_level);
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.stdout_level_filter(), LevelFilter::Info);
        assert!(config.print_timestamps_iso8601);
    }

    #[rstest]
    fn test_component_level_override() {
        let mut config = LoggerConfig::default();
        config
            .component_levels
            .insert("helm_network".to_string(), "DEBUG".to_string());
        let logger = Logger::new(config);

        assert_eq!(logger.level_for("helm_network::http"), LevelFilter::Debug);
        assert_eq!(logger.level_for("helm_common::cache"), LevelFilter::Info);
    }
}
