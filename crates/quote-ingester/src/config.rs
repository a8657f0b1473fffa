const DEFAULT_ALPHA_VANTAGE_KEY: &str = "demo";
const DEFAULT_DATABASE_URL: &str = "sqlite:daily_prices.db";

/// Settings for the market-data source and quote store
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub alpha_vantage_api_key: String,
    pub alpha_vantage_base_url: String,
    pub database_url: String,
    /// JSON symbol table; the embedded default table is used when unset
    pub symbols_file: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl IngestConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self {
            alpha_vantage_api_key: non_empty_var("AlphaVantage_API_KEY")
                .or_else(|| non_empty_var("ALPHA_VANTAGE_API_KEY"))
                .unwrap_or_else(|| DEFAULT_ALPHA_VANTAGE_KEY.to_string()),
            alpha_vantage_base_url: non_empty_var("ALPHA_VANTAGE_BASE_URL")
                .unwrap_or_else(|| alpha_vantage_client::DEFAULT_BASE_URL.to_string()),
            database_url: non_empty_var("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            symbols_file: non_empty_var("SYMBOLS_FILE"),
        }
    }

    /// True when no market-data key was configured and the public demo key is in use.
    pub fn uses_demo_key(&self) -> bool {
        self.alpha_vantage_api_key == DEFAULT_ALPHA_VANTAGE_KEY
    }
}
