//! Environment-driven configuration for the fetcher.

use std::env;

/// Runtime configuration, read once at startup. A `.env` file is honored
/// for local runs; in CI everything comes from the job environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file path.
    pub db_path: String,
    /// JSON file holding the index and constituent catalog.
    pub instruments_file: String,
    /// Optional Alpha Vantage key; without it only Yahoo is registered.
    pub alpha_vantage_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path =
            env::var("BP_DB_PATH").unwrap_or_else(|_| "./data/bistpulse.db".to_string());
        let instruments_file = env::var("BP_INSTRUMENTS_FILE")
            .unwrap_or_else(|_| "./data/catalog.json".to_string());
        let alpha_vantage_api_key = env::var("ALPHA_VANTAGE_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            db_path,
            instruments_file,
            alpha_vantage_api_key,
        }
    }
}
