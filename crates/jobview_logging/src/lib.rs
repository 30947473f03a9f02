#![deny(missing_docs)]
//! Log macros for the job view crates.
//!
//! Job state changes, ignored protocol calls and registry bookkeeping are all
//! reported through the `jobview_*` macros below, which forward to `log`. The
//! binary picks the backend; tests call [`initialize_for_tests`].

/// Per-call detail such as terminate hints.
#[macro_export]
macro_rules! jobview_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! jobview_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Updates that were ignored or clamped.
#[macro_export]
macro_rules! jobview_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Calls addressed to unknown or duplicate jobs.
#[macro_export]
macro_rules! jobview_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! jobview_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Sends job view log records to the terminal while a test runs.
///
/// Records from other crates are filtered out. Calling it again is harmless.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("jobview")
        .build();

    // Another test may have installed the logger first.
    let _ = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto);
}
