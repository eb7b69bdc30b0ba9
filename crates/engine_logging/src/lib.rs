#![deny(missing_docs)]
//! Shared logging utilities for the mailpdf workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! the event-sequence tag that prefixes every line logged while a message is
//! being dispatched, and the `simplelog` initializers for the app and tests.

use std::cell::Cell;
use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Sequence number of the message currently being dispatched on this thread.
    static EVENT_SEQ: Cell<u64> = const { Cell::new(0) };
}

/// Sets the dispatch sequence number for the current thread.
/// The dispatcher calls this once per message before running `update`.
pub fn set_event_seq(seq: u64) {
    EVENT_SEQ.with(|v| v.set(seq));
}

/// Retrieves the dispatch sequence number for the current thread.
/// Returns 0 outside of a dispatch.
pub fn event_seq() -> u64 {
    EVENT_SEQ.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current event sequence.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("[evt {}] {}", $crate::event_seq(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current event sequence.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("[evt {}] {}", $crate::event_seq(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current event sequence.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("[evt {}] {}", $crate::event_seq(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current event sequence.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("[evt {}] {}", $crate::event_seq(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current event sequence.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("[evt {}] {}", $crate::event_seq(), format_args!($($arg)*));
    }};
}

/// Destination for application log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Write to the log file only.
    #[default]
    File,
    /// Write to the terminal on stderr, keeping stdout for the console UI.
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initializes the global logger for the application.
///
/// For `LogDestination::File` or `Both`, truncates or creates `log_path`.
/// When the file cannot be created the file sink is skipped with a warning on
/// stderr; a `File`-only setup then runs without logging.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_path: &Path) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => match create_file_logger(level, config, log_path) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => {
            vec![TermLogger::new(
                level,
                config,
                TerminalMode::Stderr,
                ColorChoice::Auto,
            )]
        }
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            )];
            if let Some(file_logger) = create_file_logger(level, config, log_path) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
