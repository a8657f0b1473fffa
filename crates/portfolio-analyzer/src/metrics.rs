use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::PortfolioItem;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Aggregate value and profit/loss of a set of holdings, rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_investment: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_profit_loss: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_loss_percentage: Decimal,
}

fn to_decimal(value: f64, field: &str, symbol: &str) -> Result<Decimal, PortfolioError> {
    Decimal::from_f64(value).ok_or_else(|| {
        PortfolioError::InvalidData(format!("{} for {} is not representable: {}", field, symbol, value))
    })
}

fn overflow(what: &str) -> PortfolioError {
    PortfolioError::CalculationError(format!("{} overflowed", what))
}

/// Sum market value and cost basis over all items and derive P/L.
///
/// The percentage is 0 when nothing was invested.
pub fn compute_metrics(items: &[PortfolioItem]) -> Result<PortfolioMetrics, PortfolioError> {
    let mut total_value = Decimal::ZERO;
    let mut total_investment = Decimal::ZERO;

    for item in items {
        let symbol = item.symbol_or_unknown();
        let quantity = to_decimal(item.quantity, "quantity", symbol)?;
        let current_price = to_decimal(item.current_price, "currentPrice", symbol)?;
        let avg_buy_price = to_decimal(item.avg_buy_price, "avgBuyPrice", symbol)?;

        let market_value = quantity
            .checked_mul(current_price)
            .ok_or_else(|| overflow("market value"))?;
        let cost_basis = quantity
            .checked_mul(avg_buy_price)
            .ok_or_else(|| overflow("cost basis"))?;

        total_value = total_value
            .checked_add(market_value)
            .ok_or_else(|| overflow("total value"))?;
        total_investment = total_investment
            .checked_add(cost_basis)
            .ok_or_else(|| overflow("total investment"))?;
    }

    let total_profit_loss = total_value
        .checked_sub(total_investment)
        .ok_or_else(|| overflow("profit/loss"))?;

    let profit_loss_percentage = if total_investment.is_zero() {
        Decimal::ZERO
    } else {
        total_profit_loss
            .checked_div(total_investment)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| overflow("profit/loss percentage"))?
    };

    Ok(PortfolioMetrics {
        total_value: total_value.round_dp(2),
        total_investment: total_investment.round_dp(2),
        total_profit_loss: total_profit_loss.round_dp(2),
        profit_loss_percentage: profit_loss_percentage.round_dp(2),
    })
}
