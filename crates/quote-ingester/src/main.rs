//! quote-ingester: run one daily quote batch outside the HTTP server (cron, systemd timers).
//!
//! Usage:
//!   cargo run -p quote-ingester
//!   cargo run -p quote-ingester -- --db sqlite:daily_prices.db
//!   cargo run -p quote-ingester -- --symbols-file symbols.json --dry-run

use alpha_vantage_client::AlphaVantageClient;
use market_core::QuoteStore;
use quote_ingester::{
    DailyQuoteIngester, InMemoryQuoteStore, IngestConfig, IngestRun, QuoteDb, SymbolTable,
};
use std::sync::Arc;

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    db: Option<String>,
    symbols_file: Option<String>,
    dry_run: bool,
    help: bool,
}

fn parse_args<I>(args: I) -> anyhow::Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => parsed.help = true,
            "--dry-run" => parsed.dry_run = true,
            "--db" => {
                let url = args.next().filter(|v| !v.starts_with("--"));
                parsed.db = Some(url.ok_or_else(|| anyhow::anyhow!("--db requires a URL"))?);
            }
            "--symbols-file" => {
                let path = args.next().filter(|v| !v.starts_with("--"));
                parsed.symbols_file =
                    Some(path.ok_or_else(|| anyhow::anyhow!("--symbols-file requires a path"))?);
            }
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quote_ingester=info,alpha_vantage_client=warn".into()),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        eprintln!("Usage:");
        eprintln!("  quote-ingester                       Run today's batch");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --db URL              SQLite URL (default: $DATABASE_URL or sqlite:daily_prices.db)");
        eprintln!("  --symbols-file PATH   JSON symbol table (default: $SYMBOLS_FILE or built-in BSE list)");
        eprintln!("  --dry-run             Fetch and normalize without writing to the database");
        return Ok(());
    }

    let mut config = IngestConfig::from_env();
    if let Some(db) = args.db {
        config.database_url = db;
    }
    if args.symbols_file.is_some() {
        config.symbols_file = args.symbols_file;
    }
    let dry_run = args.dry_run;

    if config.uses_demo_key() {
        tracing::warn!("No Alpha Vantage key set (AlphaVantage_API_KEY); using the public demo key");
    }

    let symbols = SymbolTable::load(config.symbols_file.as_deref())?;
    let source = Arc::new(AlphaVantageClient::with_base_url(
        config.alpha_vantage_api_key.clone(),
        config.alpha_vantage_base_url.clone(),
    ));
    let store: Arc<dyn QuoteStore> = if dry_run {
        Arc::new(InMemoryQuoteStore::new())
    } else {
        Arc::new(QuoteDb::new(&config.database_url).await?)
    };

    tracing::info!(
        "quote-ingester: {} symbols, db={}, dry_run={}",
        symbols.len(),
        config.database_url,
        dry_run
    );

    let ingester = DailyQuoteIngester::new(source, store, symbols);

    match ingester.run().await? {
        IngestRun::AlreadyFetched { date } => {
            tracing::info!("Data already fetched for {}", date);
        }
        IngestRun::Completed(report) => {
            tracing::info!(
                "Batch {}: {} stored, {} skipped",
                report.date,
                report.fetched_count(),
                report.skipped().count()
            );
            for (outcome, reason) in report.skipped() {
                tracing::info!("  skipped {} ({}): {}", outcome.symbol, outcome.name, reason);
            }
            println!("{}", serde_json::to_string_pretty(&report.records)?);
        }
    }

    Ok(())
}
