//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a default filter (e.g. `"info"` or
/// `"placement_engine=debug"`). `RUST_LOG` still takes precedence when set.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("Logger already initialized, keeping existing configuration");
    }
}
