use axum::{extract::State, routing::get, Extension, Json, Router};
use market_core::StoredQuote;
use quote_ingester::IngestRun;
use serde::Serialize;

use crate::request_id::RequestId;
use crate::{AppError, AppState};

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResponse {
    AlreadyFetched {
        message: String,
    },
    Success {
        fetched_count: usize,
        data: Vec<StoredQuote>,
    },
}

pub fn ingest_routes() -> Router<AppState> {
    Router::new().route("/fetch-daily-stock-data", get(fetch_daily_stock_data))
}

async fn fetch_daily_stock_data(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<FetchResponse>, AppError> {
    tracing::info!(%request_id, "Daily quote fetch requested");

    let response = match state.ingester.run().await? {
        IngestRun::AlreadyFetched { .. } => FetchResponse::AlreadyFetched {
            message: "Data already fetched for today.".to_string(),
        },
        IngestRun::Completed(report) => FetchResponse::Success {
            fetched_count: report.fetched_count(),
            data: report.records,
        },
    };

    Ok(Json(response))
}
