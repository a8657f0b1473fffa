//! Once-per-day ingestion of global quotes into the `daily_prices` store.

pub mod config;
pub mod db;
pub mod ingester;
pub mod memory;
pub mod normalize;
pub mod symbols;

pub use config::IngestConfig;
pub use db::QuoteDb;
pub use ingester::{DailyQuoteIngester, IngestReport, IngestRun, OutcomeStatus, SymbolOutcome};
pub use memory::InMemoryQuoteStore;
pub use normalize::{build_record, SkipReason};
pub use symbols::{SymbolTable, SymbolTableError};
