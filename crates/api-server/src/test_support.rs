//! Fakes and request helpers shared by the route tests.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gemini_client::{GeminiError, GeminiResult, GenerateContentResponse, GenerativeModel};
use market_core::{GlobalQuote, MarketError, QuoteSource};
use quote_ingester::{DailyQuoteIngester, InMemoryQuoteStore, SymbolTable};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use crate::{build_router, AppState};

pub enum FakeReply {
    Text(&'static str),
    NoCandidates,
    Fail(fn() -> GeminiError),
}

pub struct FakeModel {
    configured: bool,
    reply: FakeReply,
    calls: Mutex<Vec<(String, Duration)>>,
}

impl FakeModel {
    pub fn replying(reply: FakeReply) -> Self {
        Self {
            configured: true,
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            reply: FakeReply::Fail(|| GeminiError::MissingApiKey),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Duration)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate_content(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> GeminiResult<GenerateContentResponse> {
        self.calls.lock().unwrap().push((prompt.to_string(), timeout));
        match &self.reply {
            FakeReply::Text(text) => Ok(GenerateContentResponse::from_text(*text)),
            FakeReply::NoCandidates => Ok(GenerateContentResponse::default()),
            FakeReply::Fail(make_err) => Err(make_err()),
        }
    }
}

#[derive(Default)]
pub struct FakeSource {
    pub quotes: HashMap<String, GlobalQuote>,
    pub calls: Mutex<usize>,
}

impl FakeSource {
    pub fn with_quote(mut self, symbol: &str, quote: Value) -> Self {
        self.quotes
            .insert(symbol.to_string(), serde_json::from_value(quote).unwrap());
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl QuoteSource for FakeSource {
    async fn global_quote(&self, symbol: &str) -> Result<Option<GlobalQuote>, MarketError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.quotes.get(symbol).cloned())
    }
}

pub fn state_with(
    model: Arc<FakeModel>,
    source: Arc<FakeSource>,
    store: Arc<InMemoryQuoteStore>,
    symbols: SymbolTable,
) -> AppState {
    AppState {
        gemini: model,
        ingester: Arc::new(DailyQuoteIngester::new(source, store, symbols)),
    }
}

/// State whose ingester has no symbols; for chat/analyze tests.
pub fn model_state(model: Arc<FakeModel>) -> AppState {
    state_with(
        model,
        Arc::new(FakeSource::default()),
        Arc::new(InMemoryQuoteStore::new()),
        SymbolTable::default(),
    )
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn router(state: AppState) -> Router {
    build_router(state)
}
