use chrono::{DateTime, Utc};
use market_core::{date_key, quote_fields, GlobalQuote, QuoteRecord, SymbolEntry};
use serde_json::Value;
use std::fmt;

const VOLUME_SCALE: f64 = 1_000_000.0;

/// Why a symbol produced no record in a batch
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Upstream returned no quote object, or an empty one
    MissingQuote,
    /// A numeric field could not be parsed
    InvalidField { field: &'static str, raw: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingQuote => write!(f, "no quote returned"),
            SkipReason::InvalidField { field, raw } => {
                write!(f, "invalid value for {:?}: {}", field, raw)
            }
        }
    }
}

fn invalid(field: &'static str, value: &Value) -> SkipReason {
    SkipReason::InvalidField {
        field,
        raw: value.to_string(),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Missing fields count as 0; strings are parsed leniently around whitespace.
fn numeric_field(quote: &GlobalQuote, field: &'static str) -> Result<f64, SkipReason> {
    match quote.get(field) {
        None => Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(field, &Value::Number(n.clone()))),
        Some(Value::String(s)) => parse_number(s).ok_or_else(|| invalid(field, &Value::String(s.clone()))),
        Some(other) => Err(invalid(field, other)),
    }
}

/// `"1.2345%"` -> 1.2345. A missing field is treated as `"0%"`.
fn percent_field(quote: &GlobalQuote, field: &'static str) -> Result<f64, SkipReason> {
    match quote.get(field) {
        None => Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(field, &Value::Number(n.clone()))),
        Some(Value::String(s)) => {
            parse_number(s.trim_matches('%')).ok_or_else(|| invalid(field, &Value::String(s.clone())))
        }
        Some(other) => Err(invalid(field, other)),
    }
}

/// Turn a raw quote into a record for `entry`, stamped with `fetched_at`.
pub fn build_record(
    entry: &SymbolEntry,
    quote: &GlobalQuote,
    fetched_at: DateTime<Utc>,
) -> Result<QuoteRecord, SkipReason> {
    if quote.is_empty() {
        return Err(SkipReason::MissingQuote);
    }

    let price = numeric_field(quote, quote_fields::PRICE)?;
    let change = numeric_field(quote, quote_fields::CHANGE)?;
    let change_percent = percent_field(quote, quote_fields::CHANGE_PERCENT)?;
    let volume = numeric_field(quote, quote_fields::VOLUME)? / VOLUME_SCALE;

    Ok(QuoteRecord {
        symbol: entry.symbol.clone(),
        name: entry.name.clone(),
        id: entry.id.to_string(),
        price,
        change,
        change_percent,
        volume,
        market_cap: None,
        fetched_at,
        fetched_at_date: date_key(fetched_at),
    })
}
