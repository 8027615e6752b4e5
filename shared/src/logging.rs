//! Logging bootstrap shared by the engine binary and tests

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise the supplied level (or "info") is
/// used. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn log_startup(component: &str) {
    tracing::info!("🚀 Starting {}", component);
}

pub fn log_shutdown(reason: &str) {
    tracing::info!("🛑 Shutting down: {}", reason);
}

pub fn log_success(message: &str) {
    tracing::info!("✅ {}", message);
}

pub fn log_error(context: &str, error: &dyn std::error::Error) {
    tracing::error!("❌ {}: {}", context, error);
}
