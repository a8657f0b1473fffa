use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub const UNKNOWN_SYMBOL: &str = "Unknown";

/// One holding as sent by the portfolio front end.
///
/// Numeric fields accept JSON numbers or numeric strings and default to 0 when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPortfolioItem")]
pub struct PortfolioItem {
    pub symbol: Option<String>,
    pub quantity: f64,
    pub current_price: f64,
    pub avg_buy_price: f64,
    /// Quantity exactly as submitted (`10`, `10.0`, `"5"`), echoed back in prompts
    #[serde(skip)]
    pub quantity_text: Option<String>,
}

impl PortfolioItem {
    pub fn symbol_or_unknown(&self) -> &str {
        self.symbol.as_deref().unwrap_or(UNKNOWN_SYMBOL)
    }

    /// Quantity as the client wrote it, falling back to the parsed value.
    pub fn quantity_display(&self) -> QuantityDisplay<'_> {
        QuantityDisplay(self)
    }
}

pub struct QuantityDisplay<'a>(&'a PortfolioItem);

impl fmt::Display for QuantityDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.quantity_text {
            Some(text) => f.write_str(text),
            None => write!(f, "{}", self.0.quantity),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPortfolioItem {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "present")]
    quantity: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    current_price: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    avg_buy_price: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it is rejected rather than read as absent.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<RawPortfolioItem> for PortfolioItem {
    type Error = String;

    fn try_from(raw: RawPortfolioItem) -> Result<Self, Self::Error> {
        let quantity_text = match &raw.quantity {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Ok(Self {
            symbol: raw.symbol,
            quantity: lenient_f64(raw.quantity, "quantity")?,
            current_price: lenient_f64(raw.current_price, "currentPrice")?,
            avg_buy_price: lenient_f64(raw.avg_buy_price, "avgBuyPrice")?,
            quantity_text,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, rename = "portfolioItems")]
    pub portfolio_items: Option<Vec<PortfolioItem>>,
}

impl AnalyzeRequest {
    /// Items to analyze; absent and `null` both mean none.
    pub fn into_items(self) -> Vec<PortfolioItem> {
        self.portfolio_items.unwrap_or_default()
    }
}

/// Absent is 0; present values must be a finite number or numeric string.
fn lenient_f64(value: Option<Value>, field: &str) -> Result<f64, String> {
    match value {
        None => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("{}: number out of range: {}", field, n)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("{}: invalid number: {:?}", field, s)),
        Some(other) => Err(format!("{}: expected a number, got {}", field, other)),
    }
}
