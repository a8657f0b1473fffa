use gemini_client::GeminiConfig;
use quote_ingester::IngestConfig;

const DEFAULT_PORT: u16 = 5000;

/// Server configuration, read once at startup after `.env` is loaded.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Emit JSON log lines (`RUST_LOG_FORMAT=json`)
    pub json_logs: bool,
    pub gemini: GeminiConfig,
    pub ingest: IngestConfig,
}

impl AppConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            json_logs: std::env::var("RUST_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            gemini: GeminiConfig::from_env(),
            ingest: IngestConfig::from_env(),
        }
    }
}

/// Mask an API key for logging, keeping the first and last four characters.
pub(crate) fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
