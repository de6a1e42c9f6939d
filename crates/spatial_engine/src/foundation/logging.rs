//! Logging utilities
//!
//! The crate logs through the `log` facade; hosts pick the backend. These
//! helpers install `env_logger` for binaries and tests that have none.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// # Panics
/// Panics if a global logger has already been installed.
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, ignoring an already-installed logger
pub fn try_init() {
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}
