//! Logging abstraction
//!
//! Unified logging macros for both build modes:
//! - Embedded: forwards to `defmt` (RTT transport is chosen by the binary)
//! - Host: compiles to nothing, arguments are still type-checked
//!
//! None of these are called from interrupt dispatch.

/// Log at info level
#[cfg(feature = "embedded")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { defmt::info!($($arg)*) };
}

/// Log at info level
#[cfg(not(feature = "embedded"))]
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}

/// Log at debug level
#[cfg(feature = "embedded")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

/// Log at debug level
#[cfg(not(feature = "embedded"))]
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}

/// Log at warn level
#[cfg(feature = "embedded")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { defmt::warn!($($arg)*) };
}

/// Log at warn level
#[cfg(not(feature = "embedded"))]
#[macro_export]
macro_rules! log_warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}
