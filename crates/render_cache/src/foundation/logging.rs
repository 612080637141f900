//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize logging for unit tests.
///
/// Output is captured by the test harness and repeated calls are ignored.
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Initialize logging with an explicit filter, such as
/// [`RenderCacheConfig::log_level`](crate::core::RenderCacheConfig::log_level).
///
/// `RUST_LOG` is ignored. Returns `false` if a logger was already installed.
pub fn init_with_filter(filter: &str) -> bool {
    env_logger::Builder::new().parse_filters(filter).try_init().is_ok()
}
