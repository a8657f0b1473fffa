use chrono::{DateTime, Utc};
use market_core::{date_key, MarketError, QuoteSource, QuoteStore, StoredQuote};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::normalize::{build_record, SkipReason};
use crate::symbols::SymbolTable;

/// What happened to one configured symbol during a batch
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    Stored { storage_id: String },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome {
    pub name: String,
    pub symbol: String,
    pub status: OutcomeStatus,
}

/// Result of a batch that passed the daily gate
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// UTC date the batch was recorded under
    pub date: String,
    /// One entry per configured symbol, in table order
    pub outcomes: Vec<SymbolOutcome>,
    /// Stored records, in table order
    pub records: Vec<StoredQuote>,
}

impl IngestReport {
    pub fn fetched_count(&self) -> usize {
        self.records.len()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&SymbolOutcome, &SkipReason)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            OutcomeStatus::Skipped(reason) => Some((o, reason)),
            OutcomeStatus::Stored { .. } => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum IngestRun {
    /// A record for this date already exists; nothing was fetched or written
    AlreadyFetched { date: String },
    Completed(IngestReport),
}

/// Fetches one quote per configured symbol and stores it, at most once per UTC day.
pub struct DailyQuoteIngester {
    source: Arc<dyn QuoteSource>,
    store: Arc<dyn QuoteStore>,
    symbols: SymbolTable,
    /// Held for a whole batch so the date gate and the inserts are not interleaved
    batch_lock: Mutex<()>,
}

impl DailyQuoteIngester {
    pub fn new(source: Arc<dyn QuoteSource>, store: Arc<dyn QuoteStore>, symbols: SymbolTable) -> Self {
        Self {
            source,
            store,
            symbols,
            batch_lock: Mutex::new(()),
        }
    }

    /// Run a batch for the current UTC date.
    pub async fn run(&self) -> Result<IngestRun, MarketError> {
        self.run_with_clock(Utc::now).await
    }

    /// Run a batch as if the clock read `now` for the whole batch.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<IngestRun, MarketError> {
        self.run_with_clock(move || now).await
    }

    async fn run_with_clock<C>(&self, clock: C) -> Result<IngestRun, MarketError>
    where
        C: Fn() -> DateTime<Utc>,
    {
        let _guard = self.batch_lock.lock().await;

        let date = date_key(clock());

        if self.store.find_one_by_date(&date).await?.is_some() {
            tracing::info!("Quotes already fetched for {}, skipping batch", date);
            return Ok(IngestRun::AlreadyFetched { date });
        }

        tracing::info!("Fetching daily quotes for {} symbols ({})", self.symbols.len(), date);

        let mut report = IngestReport {
            date: date.clone(),
            ..IngestReport::default()
        };

        for entry in self.symbols.entries() {
            let quote = self.source.global_quote(&entry.symbol).await?;

            let built = match quote {
                Some(quote) => build_record(entry, &quote, clock()),
                None => Err(SkipReason::MissingQuote),
            };

            let status = match built {
                Ok(mut record) => {
                    record.fetched_at_date = date.clone();
                    let storage_id = self.store.insert_one(&record).await?;
                    tracing::debug!("Stored {} ({}) as {}", entry.symbol, entry.name, storage_id);

                    report.records.push(StoredQuote {
                        storage_id: storage_id.clone(),
                        record,
                    });
                    OutcomeStatus::Stored { storage_id }
                }
                Err(reason) => {
                    tracing::warn!("Skipping {} ({}): {}", entry.symbol, entry.name, reason);
                    OutcomeStatus::Skipped(reason)
                }
            };

            report.outcomes.push(SymbolOutcome {
                name: entry.name.clone(),
                symbol: entry.symbol.clone(),
                status,
            });
        }

        tracing::info!(
            "Daily quote batch {} done: {} stored, {} skipped",
            date,
            report.fetched_count(),
            report.outcomes.len() - report.fetched_count()
        );

        Ok(IngestRun::Completed(report))
    }
}
