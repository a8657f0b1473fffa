use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field labels used by the `GLOBAL_QUOTE` payload
pub mod quote_fields {
    pub const PRICE: &str = "05. price";
    pub const VOLUME: &str = "06. volume";
    pub const CHANGE: &str = "09. change";
    pub const CHANGE_PERCENT: &str = "10. change percent";
}

/// Raw quote object as returned by the market-data API, keyed by field label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalQuote(pub Map<String, Value>);

impl GlobalQuote {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

impl From<Map<String, Value>> for GlobalQuote {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One configured ticker: display name, exchange symbol and stable numeric id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub symbol: String,
    pub id: u64,
}

/// Daily quote record as persisted by the ingester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub symbol: String,
    pub name: String,
    pub id: String,
    pub price: f64,
    pub change: f64,
    #[serde(rename = "changePercent")]
    pub change_percent: f64,
    /// Trading volume in millions
    pub volume: f64,
    #[serde(rename = "marketCap")]
    pub market_cap: Option<f64>,
    pub fetched_at: DateTime<Utc>,
    pub fetched_at_date: String,
}

/// A record together with the identifier the store generated for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuote {
    #[serde(rename = "_id")]
    pub storage_id: String,
    #[serde(flatten)]
    pub record: QuoteRecord,
}

/// UTC calendar date string used as the idempotency key.
pub fn date_key(at: DateTime<Utc>) -> String {
    at.date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> QuoteRecord {
        let fetched_at = Utc.with_ymd_and_hms(2026, 10, 19, 23, 59, 30).unwrap();
        QuoteRecord {
            symbol: "TCS.BSE".to_string(),
            name: "TCS".to_string(),
            id: "2".to_string(),
            price: 4012.5,
            change: -12.25,
            change_percent: -0.3044,
            volume: 0.123456,
            market_cap: None,
            fetched_at,
            fetched_at_date: date_key(fetched_at),
        }
    }

    #[test]
    fn test_date_key_uses_utc_calendar_date() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 1).unwrap();
        assert_eq!(date_key(at), "2026-01-05");
    }

    #[test]
    fn test_stored_quote_json_shape() {
        let stored = StoredQuote {
            storage_id: "17".to_string(),
            record: sample_record(),
        };

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["_id"], "17");
        assert_eq!(json["symbol"], "TCS.BSE");
        assert_eq!(json["id"], "2");
        assert_eq!(json["changePercent"], -0.3044);
        assert!(json["marketCap"].is_null());
        assert_eq!(json["fetched_at_date"], "2026-10-19");
        assert!(json.get("change_percent").is_none());
    }

    #[test]
    fn test_global_quote_deserializes_from_object() {
        let quote: GlobalQuote = serde_json::from_value(serde_json::json!({
            "01. symbol": "INFY.BSE",
            "05. price": "1502.3000"
        }))
        .unwrap();

        assert!(!quote.is_empty());
        assert_eq!(quote.get(quote_fields::PRICE).unwrap(), "1502.3000");
        assert!(quote.get(quote_fields::VOLUME).is_none());
    }
}
