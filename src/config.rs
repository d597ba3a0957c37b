use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "DermaLens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/DermaLens/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("DermaLens")
}

/// Get the models directory (ONNX classifier/detector files)
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "dermalens=info".to_string()
}

/// Initialize tracing for hosts that don't install their own subscriber.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .init();
}

// ═══════════════════════════════════════════════════════════
// AnalysisConfig
// ═══════════════════════════════════════════════════════════

/// Tunables for one analysis pipeline instance.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Ceiling on waiting for any slot beyond `general`. A slot that does
    /// not resolve in time counts as failed for this call; its underlying
    /// load is not cancelled.
    /// Default: 3 seconds.
    pub aux_slot_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            aux_slot_timeout: Duration::from_secs(3),
        }
    }
}
