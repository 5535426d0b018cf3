//! Logger initialization.
//!
//! The crate itself only emits through the `log` facade. Binaries and tests
//! call [`init_logging`] once to install `env_logger` (or `console_log` on the
//! web).

use std::sync::Once;

/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "plot_sync=debug,wgpu=warn"). When unset, `RUST_LOG` is used and
/// otherwise everything at `warn` and above is shown.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub is_test: bool,
}

static INIT: Once = Once::new();

/// Installs the global logger. Subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut builder = env_logger::Builder::new();
            if let Some(filter) = config.env_filter {
                builder.parse_filters(&filter);
            } else if let Ok(filter) = std::env::var("RUST_LOG") {
                builder.parse_filters(&filter);
            } else {
                builder.filter_level(log::LevelFilter::Warn);
            }
            builder.is_test(config.is_test);
            if let Err(e) = builder.try_init() {
                println!("Warning: Could not initialize logger: {}", e);
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let _ = config;
            // A second logger on the page is not fatal.
            let _ = console_log::init_with_level(log::Level::Info);
        }

        log::debug!("logging initialized");
    });
}
