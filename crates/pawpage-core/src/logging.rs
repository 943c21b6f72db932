#![forbid(unsafe_code)]

//! Logging support for page components.
//!
//! With the `tracing` feature the `tracing` macros are re-exported at the
//! crate root, so components write `crate::debug!(...)` regardless of the
//! build. Without it, no-op macros with the same names are exported instead
//! and every log statement compiles away.
//!
//! The web crate turns the feature on and installs a console subscriber;
//! native test builds leave it off.

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op `debug!` when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op `info!` when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op `trace!` when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op `warn!` when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

/// Whether log statements in this crate are compiled in.
#[must_use]
pub const fn enabled() -> bool {
    cfg!(feature = "tracing")
}
