#![deny(missing_docs)]
//! Shared logging utilities for the overlay workspace.
//!
//! This crate provides the `sentinel_*` logging macros used across the
//! codebase. Every line is tagged with the overlay session that was active on
//! the logging thread, so a close/reopen cycle is easy to follow in the log.

use std::cell::Cell;

thread_local! {
    /// Overlay session active on this thread. Zero means "no panel open yet".
    static SESSION: Cell<u64> = const { Cell::new(0) };
}

/// Records the overlay session for log lines emitted on the current thread.
/// The controller calls this after every state transition.
pub fn set_session(session: u64) {
    SESSION.with(|v| v.set(session));
}

/// Returns the overlay session recorded for the current thread.
pub fn current_session() -> u64 {
    SESSION.with(|v| v.get())
}

/// Shared expansion for the level macros below.
#[doc(hidden)]
#[macro_export]
macro_rules! __sentinel_log {
    ($level:ident, $($arg:tt)*) => {{
        log::$level!("[s{}] {}", $crate::current_session(), format_args!($($arg)*));
    }};
}

/// Logs a trace-level message tagged with the current session.
#[macro_export]
macro_rules! sentinel_trace {
    ($($arg:tt)*) => { $crate::__sentinel_log!(trace, $($arg)*) };
}

/// Logs a debug-level message tagged with the current session.
#[macro_export]
macro_rules! sentinel_debug {
    ($($arg:tt)*) => { $crate::__sentinel_log!(debug, $($arg)*) };
}

/// Logs an info-level message tagged with the current session.
#[macro_export]
macro_rules! sentinel_info {
    ($($arg:tt)*) => { $crate::__sentinel_log!(info, $($arg)*) };
}

/// Logs a warn-level message tagged with the current session.
#[macro_export]
macro_rules! sentinel_warn {
    ($($arg:tt)*) => { $crate::__sentinel_log!(warn, $($arg)*) };
}

/// Logs an error-level message tagged with the current session.
#[macro_export]
macro_rules! sentinel_error {
    ($($arg:tt)*) => { $crate::__sentinel_log!(error, $($arg)*) };
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
