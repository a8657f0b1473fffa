use async_trait::async_trait;
use crate::{GlobalQuote, MarketError, QuoteRecord};

/// Source of point-in-time quotes for a single ticker.
///
/// `Ok(None)` means the upstream answered but carried no usable quote object;
/// transport and decoding failures are `Err`.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn global_quote(&self, symbol: &str) -> Result<Option<GlobalQuote>, MarketError>;
}

/// Document store for daily quote records
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Any record whose `fetched_at_date` equals `date`.
    async fn find_one_by_date(&self, date: &str) -> Result<Option<QuoteRecord>, MarketError>;

    /// Persist one record and return its generated identifier.
    async fn insert_one(&self, record: &QuoteRecord) -> Result<String, MarketError>;
}
