use async_trait::async_trait;
use market_core::{GlobalQuote, MarketError, QuoteSource};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AlphaVantageClient {
    /// `base_url` is normally [`DEFAULT_BASE_URL`]; tests point it at a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            // No request timeout: a slow quote blocks its batch rather than dropping the symbol
            client: reqwest::Client::new(),
        }
    }

    /// Get the latest global quote for a symbol.
    ///
    /// Returns `Ok(None)` when the payload has no usable `"Global Quote"` object,
    /// which is also how Alpha Vantage reports unknown symbols and rate limiting.
    pub async fn get_global_quote(&self, symbol: &str) -> Result<Option<GlobalQuote>, MarketError> {
        let url = format!("{}/query", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        // The status is not checked on its own: Alpha Vantage answers rate
        // limits and bad symbols with a JSON notice, which only skips the symbol.
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        let json: Value = serde_json::from_str(&body).map_err(|e| {
            MarketError::ApiError(format!("HTTP {}: unreadable quote payload ({})", status, e))
        })?;

        if !status.is_success() {
            tracing::warn!("Alpha Vantage returned HTTP {} for {}", status, symbol);
        }

        if let Some(note) = json.get("Note").or_else(|| json.get("Information")) {
            tracing::warn!("Alpha Vantage rate limit for {}: {}", symbol, note);
        }

        if let Some(error) = json.get("Error Message") {
            tracing::warn!("Alpha Vantage error for {}: {}", symbol, error);
        }

        let quote = match json.get("Global Quote") {
            Some(Value::Object(map)) if !map.is_empty() => GlobalQuote::from(map.clone()),
            _ => return Ok(None),
        };

        Ok(Some(quote))
    }
}

/// reqwest includes the request URL, and with it the `apikey` query
/// parameter, in its error text.
fn transport_error(e: reqwest::Error) -> MarketError {
    MarketError::ApiError(e.without_url().to_string())
}

#[async_trait]
impl QuoteSource for AlphaVantageClient {
    async fn global_quote(&self, symbol: &str) -> Result<Option<GlobalQuote>, MarketError> {
        self.get_global_quote(symbol).await
    }
}
