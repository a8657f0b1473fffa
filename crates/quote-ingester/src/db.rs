use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_core::{MarketError, QuoteRecord, QuoteStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    symbol: String,
    name: String,
    stock_id: String,
    price: f64,
    price_change: f64,
    change_percent: f64,
    volume: f64,
    market_cap: Option<f64>,
    fetched_at: DateTime<Utc>,
    fetched_at_date: String,
}

impl From<QuoteRow> for QuoteRecord {
    fn from(row: QuoteRow) -> Self {
        QuoteRecord {
            symbol: row.symbol,
            name: row.name,
            id: row.stock_id,
            price: row.price,
            change: row.price_change,
            change_percent: row.change_percent,
            volume: row.volume,
            market_cap: row.market_cap,
            fetched_at: row.fetched_at,
            fetched_at_date: row.fetched_at_date,
        }
    }
}

fn db_error(e: sqlx::Error) -> MarketError {
    MarketError::DatabaseError(e.to_string())
}

/// SQLite-backed `QuoteStore` over the `daily_prices` table
#[derive(Clone)]
pub struct QuoteDb {
    pool: SqlitePool,
}

impl QuoteDb {
    /// Create a new database connection
    pub async fn new(database_url: &str) -> Result<Self, MarketError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(db_error)?
            .create_if_missing(true);

        // Every connection to `:memory:` is its own database, so keep exactly one alive
        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await.map_err(db_error)?;

        let db = Self { pool };
        db.init_schema().await?;

        Ok(db)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<(), MarketError> {
        let schema = include_str!("../schema.sql");

        // sqlx executes one statement per query
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await.map_err(db_error)?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl QuoteStore for QuoteDb {
    async fn find_one_by_date(&self, date: &str) -> Result<Option<QuoteRecord>, MarketError> {
        let row = sqlx::query_as::<_, QuoteRow>(
            "SELECT symbol, name, stock_id, price, price_change, change_percent, volume,
                    market_cap, fetched_at, fetched_at_date
             FROM daily_prices WHERE fetched_at_date = ? LIMIT 1",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(QuoteRecord::from))
    }

    async fn insert_one(&self, record: &QuoteRecord) -> Result<String, MarketError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO daily_prices
                (symbol, name, stock_id, price, price_change, change_percent, volume,
                 market_cap, fetched_at, fetched_at_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&record.symbol)
        .bind(&record.name)
        .bind(&record.id)
        .bind(record.price)
        .bind(record.change)
        .bind(record.change_percent)
        .bind(record.volume)
        .bind(record.market_cap)
        .bind(record.fetched_at)
        .bind(&record.fetched_at_date)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(id.to_string())
    }
}
