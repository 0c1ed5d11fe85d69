//! # Application Configuration
//!
//! Environment-driven configuration with platform-directory fallbacks.
//!
//! ## Environment Variables
//! ```text
//! DUKAAN_STORE_NAME         Store name printed on invoices
//! DUKAAN_CURRENCY_SYMBOL    Currency prefix for display (default "Rs.")
//! DUKAAN_DB_PATH            SQLite file path (default: platform data dir)
//! DUKAAN_DRAFT_TTL_MINUTES  Sale draft lifetime (default 30)
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use tracing::warn;

/// Default draft lifetime in minutes.
const DEFAULT_DRAFT_TTL_MINUTES: u64 = 30;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Store name shown on invoices.
    pub store_name: String,

    /// Currency prefix for display formatting.
    pub currency_symbol: String,

    /// SQLite database file path.
    pub db_path: PathBuf,

    /// How long an abandoned sale draft survives before purging.
    pub draft_ttl: Duration,
}

impl AppConfig {
    /// Loads configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let store_name =
            env::var("DUKAAN_STORE_NAME").unwrap_or_else(|_| "Dukaan POS".to_string());

        let currency_symbol =
            env::var("DUKAAN_CURRENCY_SYMBOL").unwrap_or_else(|_| "Rs.".to_string());

        let db_path = env::var("DUKAAN_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        let draft_ttl_minutes = env::var("DUKAAN_DRAFT_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_DRAFT_TTL_MINUTES);

        AppConfig {
            store_name,
            currency_symbol,
            db_path,
            draft_ttl: Duration::from_secs(draft_ttl_minutes * 60),
        }
    }

    /// Formats an amount for display: symbol, space, two decimals.
    ///
    /// Internal amounts are full-precision; rounding happens only here.
    pub fn format_currency(&self, amount: f64) -> String {
        format!("{} {:.2}", self.currency_symbol, amount)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store_name: "Dukaan POS".to_string(),
            currency_symbol: "Rs.".to_string(),
            db_path: default_db_path(),
            draft_ttl: Duration::from_secs(DEFAULT_DRAFT_TTL_MINUTES * 60),
        }
    }
}

/// Resolves the platform data directory for the database file.
///
/// Linux: `~/.local/share/dukaan-pos/dukaan.db`
/// macOS: `~/Library/Application Support/com.dukaan.pos/dukaan.db`
fn default_db_path() -> PathBuf {
    match ProjectDirs::from("com", "dukaan", "pos") {
        Some(dirs) => dirs.data_dir().join("dukaan.db"),
        None => {
            warn!("No platform data directory available, using working directory");
            PathBuf::from("./dukaan.db")
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
