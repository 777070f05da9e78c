//! Unified logging for debug output.
//!
//! Compact timestamped logging with per-module level configuration, driven
//! by [`LoggingConfig`] with `RUST_LOG` taking precedence at runtime.
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! default = "warn"  # quiet by default
//!
//! [logging.modules]
//! docwatch = "debug"  # enable watcher debug logs
//! ```
//!
//! # Environment Variable
//!
//! ```bash
//! RUST_LOG=debug my-docs-tool develop
//! RUST_LOG=docwatch=trace my-docs-tool develop
//! ```

use std::sync::Once;

use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Initialize logging with configuration.
///
/// Call once at startup. Safe to call multiple times (only the first call
/// takes effect). The `RUST_LOG` environment variable takes precedence
/// over config settings.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            let mut filter_str = config.default.clone();
            for (module, level) in &config.modules {
                filter_str.push_str(&format!(",{module}={level}"));
            }
            EnvFilter::new(&filter_str)
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

/// Initialize logging with default configuration.
///
/// Uses `LoggingConfig::default()` (`default = "warn"`). Use `RUST_LOG`
/// for verbose output.
pub fn init() {
    init_with_config(&LoggingConfig::default());
}

/// Log an event with its context.
///
/// # Examples
/// ```ignore
/// log_event!("watcher", "monitoring", "{} roots", roots.len());
/// log_event!("watcher", "started");
/// ```
#[macro_export]
macro_rules! log_event {
    ($context:expr, $event:expr) => {
        tracing::info!("[{}] {}", $context, $event)
    };
    ($context:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $context, $event, format!($($arg)*))
    };
}

/// Debug-only event logging.
///
/// # Examples
/// ```ignore
/// debug_event!("watcher", "flush", "{} changes", batch.len());
/// ```
#[macro_export]
macro_rules! debug_event {
    ($context:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $context, $event)
    };
    ($context:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $context, $event, format!($($arg)*))
    };
}
