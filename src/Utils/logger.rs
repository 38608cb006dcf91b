//! Logging setup: a `simplelog` terminal logger, optionally combined with a file logger.
//!
//! Library code only talks to the `log` facade; binaries, benches and tests that want to see
//! the rewrite passes or the quadrature fallback call [`init_logger`] once.
use crate::symbolic::symbolic_error::{SymbolicError, SymbolicResult};
use log::info;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct LoggerSettings {
    pub level: LevelFilter,
    /// log to the terminal
    pub terminal: bool,
    /// log to this file as well
    pub file: Option<PathBuf>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        LoggerSettings {
            level: LevelFilter::Info,
            terminal: true,
            file: None,
        }
    }
}

impl LoggerSettings {
    /// Settings with the level given by name: `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub fn with_level_name(mut self, name: &str) -> SymbolicResult<Self> {
        self.level = match name.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            other => {
                return Err(SymbolicError::Config(format!(
                    "loglevel must be off, error, warn, info, debug or trace, got '{}'",
                    other
                )));
            }
        };
        Ok(self)
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }
}

/// Installs the global logger. Returns `false` if a logger was already installed, in which case
/// the existing one is kept.
///
/// # Errors
/// `Config` if the log file cannot be created.
pub fn init_logger(settings: &LoggerSettings) -> SymbolicResult<bool> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if settings.terminal {
        loggers.push(TermLogger::new(
            settings.level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if let Some(path) = &settings.file {
        let file = File::create(path).map_err(|e| {
            SymbolicError::Config(format!("cannot create log file {}: {}", path.display(), e))
        })?;
        loggers.push(WriteLogger::new(settings.level, Config::default(), file));
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => {
            info!("logger initialized at level {}", settings.level);
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}
