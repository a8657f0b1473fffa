//! HTTP surface: chat proxy, portfolio analysis and the daily quote fetch.

pub mod analyze_routes;
pub mod chat_routes;
pub mod config;
pub mod ingest_routes;
pub mod request_id;

#[cfg(test)]
mod test_support;

use alpha_vantage_client::AlphaVantageClient;
use axum::{
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Json, Router,
};
use gemini_client::{GeminiClient, GenerativeModel};
use quote_ingester::{DailyQuoteIngester, QuoteDb, SymbolTable};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{mask_api_key, AppConfig};

#[derive(Clone)]
pub struct AppState {
    pub gemini: Arc<dyn GenerativeModel>,
    pub ingester: Arc<DailyQuoteIngester>,
}

/// Catch-all server error; details go to the log, never to the client.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "error",
                "message": "Internal server error",
            })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(chat_routes::chat_routes())
        .merge(analyze_routes::analyze_routes())
        .merge(ingest_routes::ingest_routes())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn init_tracing(json_logs: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "api_server=info,quote_ingester=info,tower_http=info".into());

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(config.json_logs);

    match config.gemini.api_key.as_deref() {
        Some(key) => tracing::info!("Gemini API key loaded ({})", mask_api_key(key)),
        None => tracing::warn!("GEMINI_API_KEY not set; /chat and /analyze will fail"),
    }
    if config.ingest.uses_demo_key() {
        tracing::warn!("No Alpha Vantage key set (AlphaVantage_API_KEY); using the public demo key");
    } else {
        tracing::info!(
            "Alpha Vantage API key loaded ({})",
            mask_api_key(&config.ingest.alpha_vantage_api_key)
        );
    }

    let symbols = SymbolTable::load(config.ingest.symbols_file.as_deref())?;
    let store = QuoteDb::new(&config.ingest.database_url).await?;
    let source = AlphaVantageClient::with_base_url(
        config.ingest.alpha_vantage_api_key.clone(),
        config.ingest.alpha_vantage_base_url.clone(),
    );
    tracing::info!("Loaded {} symbols for daily ingestion", symbols.len());

    let state = AppState {
        gemini: Arc::new(GeminiClient::new(config.gemini.clone())),
        ingester: Arc::new(DailyQuoteIngester::new(
            Arc::new(source),
            Arc::new(store),
            symbols,
        )),
    };

    let app = build_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
