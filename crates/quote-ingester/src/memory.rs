use async_trait::async_trait;
use market_core::{MarketError, QuoteRecord, QuoteStore};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Process-local `QuoteStore`, used for tests and dry runs.
///
/// Ids are sequential integers starting at 1, mirroring SQLite rowids.
#[derive(Default)]
pub struct InMemoryQuoteStore {
    records: RwLock<Vec<QuoteRecord>>,
    inserts: AtomicUsize,
    fail_inserts: AtomicBool,
}

impl InMemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<QuoteRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    /// Make every subsequent insert fail, to simulate an unavailable database.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `insert_one` calls.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub async fn records(&self) -> Vec<QuoteRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn find_one_by_date(&self, date: &str) -> Result<Option<QuoteRecord>, MarketError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.fetched_at_date == date).cloned())
    }

    async fn insert_one(&self, record: &QuoteRecord) -> Result<String, MarketError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(MarketError::DatabaseError("store unavailable".to_string()));
        }

        let mut records = self.records.write().await;
        records.push(record.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(records.len().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(date: &str) -> QuoteRecord {
        QuoteRecord {
            symbol: "TCS.BSE".to_string(),
            name: "TCS".to_string(),
            id: "2".to_string(),
            price: 1.0,
            change: 0.0,
            change_percent: 0.0,
            volume: 0.0,
            market_cap: None,
            fetched_at: Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap(),
            fetched_at_date: date.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_by_date() {
        let store = InMemoryQuoteStore::new();
        assert!(store.find_one_by_date("2026-10-19").await.unwrap().is_none());

        let first = store.insert_one(&record("2026-10-19")).await.unwrap();
        let second = store.insert_one(&record("2026-10-19")).await.unwrap();
        assert_eq!(first, "1");
        assert_eq!(second, "2");

        assert!(store.find_one_by_date("2026-10-19").await.unwrap().is_some());
        assert!(store.find_one_by_date("2026-10-18").await.unwrap().is_none());
        assert_eq!(store.insert_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_inserts() {
        let store = InMemoryQuoteStore::new();
        store.fail_inserts(true);

        let result = store.insert_one(&record("2026-10-19")).await;
        assert!(matches!(result, Err(MarketError::DatabaseError(_))));
        assert!(store.records().await.is_empty());
    }
}
