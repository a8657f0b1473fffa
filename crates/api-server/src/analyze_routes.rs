//! Portfolio Analysis API Routes
//!
//! Computes value/P&L metrics for the submitted holdings and asks the
//! generative model for a narrative review of them.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use gemini_client::GeminiError;
use portfolio_analyzer::{
    analysis_prompt, compute_metrics, AnalyzeRequest, PortfolioError, PortfolioMetrics,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::AppState;

const ANALYZE_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_ANALYSIS: &str = "Unable to generate analysis - unexpected API response";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub metrics: PortfolioMetrics,
    pub analysis: String,
    pub timestamp: String,
    pub items_analyzed: usize,
}

#[derive(Debug)]
pub enum AnalyzeError {
    NotConfigured,
    NoPortfolioData,
    NoPortfolioItems,
    InvalidPortfolio(String),
    Timeout,
    Upstream(String),
    Internal(String),
}

impl From<GeminiError> for AnalyzeError {
    fn from(e: GeminiError) -> Self {
        match e {
            GeminiError::MissingApiKey => AnalyzeError::NotConfigured,
            GeminiError::Timeout => AnalyzeError::Timeout,
            GeminiError::Request(_) | GeminiError::Status(_) | GeminiError::Decode(_) => {
                AnalyzeError::Upstream(e.to_string())
            }
        }
    }
}

impl From<PortfolioError> for AnalyzeError {
    fn from(e: PortfolioError) -> Self {
        match e {
            PortfolioError::InvalidData(msg) => AnalyzeError::InvalidPortfolio(msg),
            PortfolioError::CalculationError(msg) => AnalyzeError::Internal(msg),
        }
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AnalyzeError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Gemini API key not configured",
            ),
            AnalyzeError::NoPortfolioData => (StatusCode::BAD_REQUEST, "No portfolio data provided"),
            AnalyzeError::NoPortfolioItems => (
                StatusCode::BAD_REQUEST,
                "No portfolio items found to analyze",
            ),
            AnalyzeError::InvalidPortfolio(detail) => {
                tracing::warn!("Rejected portfolio: {}", detail);
                (StatusCode::BAD_REQUEST, "Invalid portfolio data")
            }
            AnalyzeError::Timeout => {
                tracing::error!("Gemini API request timed out");
                (StatusCode::GATEWAY_TIMEOUT, "Gemini API timed out. Try again.")
            }
            AnalyzeError::Upstream(detail) => {
                tracing::error!("Gemini API request error: {}", detail);
                (StatusCode::BAD_GATEWAY, "Failed to contact Gemini API")
            }
            AnalyzeError::Internal(detail) => {
                tracing::error!("Unexpected error during analysis: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected server error")
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    if !state.gemini.is_configured() {
        return Err(AnalyzeError::NotConfigured);
    }

    let body = match payload {
        Ok(Json(body)) if !is_blank(&body) => body,
        _ => return Err(AnalyzeError::NoPortfolioData),
    };
    if !body.is_object() {
        return Err(AnalyzeError::NoPortfolioData);
    }

    let request: AnalyzeRequest = serde_json::from_value(body)
        .map_err(|e| AnalyzeError::InvalidPortfolio(e.to_string()))?;
    let items = request.into_items();
    if items.is_empty() {
        return Err(AnalyzeError::NoPortfolioItems);
    }

    tracing::info!("Processing {} portfolio items...", items.len());

    let metrics = compute_metrics(&items)?;
    let prompt = analysis_prompt(&metrics, &items);

    let response = state
        .gemini
        .generate_content(&prompt, ANALYZE_TIMEOUT)
        .await?;

    let analysis = match response.first_text() {
        Some(text) => text.to_string(),
        None => {
            tracing::warn!("Unexpected Gemini response format; returning fallback analysis");
            FALLBACK_ANALYSIS.to_string()
        }
    };

    Ok(Json(AnalyzeResponse {
        success: true,
        metrics,
        analysis,
        timestamp: chrono::Utc::now().to_rfc3339(),
        items_analyzed: items.len(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use approx::assert_relative_eq;
    use axum::http::StatusCode;
    use gemini_client::GeminiError;
    use std::sync::Arc;
    use std::time::Duration;

    const PORTFOLIO: &str = r#"{
        "portfolioItems": [
            {"symbol": "TCS", "quantity": 10, "currentPrice": 4000, "avgBuyPrice": 3500},
            {"symbol": "INFY", "quantity": "5", "currentPrice": "1500", "avgBuyPrice": 1600}
        ]
    }"#;

    #[tokio::test]
    async fn test_analyze_returns_metrics_and_analysis() {
        let model = Arc::new(FakeModel::replying(FakeReply::Text("Looks **healthy**.")));
        let app = router(model_state(model.clone()));

        let (status, body) = send(app, post_json("/analyze", PORTFOLIO)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["analysis"], "Looks **healthy**.");
        assert_eq!(body["itemsAnalyzed"], 2);
        assert_relative_eq!(body["metrics"]["totalValue"].as_f64().unwrap(), 47500.0);
        assert_relative_eq!(body["metrics"]["totalInvestment"].as_f64().unwrap(), 43000.0);
        assert_relative_eq!(body["metrics"]["totalProfitLoss"].as_f64().unwrap(), 4500.0);
        assert_relative_eq!(body["metrics"]["profitLossPercentage"].as_f64().unwrap(), 10.47);
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("TCS: 10 shares @ ₹3500.00 (Current: ₹4000.00)"));
        assert_eq!(calls[0].1, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_analyze_without_key_is_server_error() {
        let model = Arc::new(FakeModel::unconfigured());
        let app = router(model_state(model.clone()));

        let (status, body) = send(app, post_json("/analyze", PORTFOLIO)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Gemini API key not configured");
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_rejects_missing_data() {
        let model = Arc::new(FakeModel::replying(FakeReply::Text("unused")));

        for body in ["", "{}", "null", "[1, 2]"] {
            let app = router(model_state(model.clone()));
            let (status, json) = send(app, post_json("/analyze", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
            assert_eq!(json["message"], "No portfolio data provided");
        }
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_rejects_empty_items() {
        let model = Arc::new(FakeModel::replying(FakeReply::Text("unused")));

        for body in [r#"{"portfolioItems": []}"#, r#"{"userId": 7}"#] {
            let app = router(model_state(model.clone()));
            let (status, json) = send(app, post_json("/analyze", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["message"], "No portfolio items found to analyze");
        }
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_numeric_quantity() {
        let model = Arc::new(FakeModel::replying(FakeReply::Text("unused")));
        let app = router(model_state(model.clone()));

        let (status, json) = send(
            app,
            post_json("/analyze", r#"{"portfolioItems": [{"symbol": "TCS", "quantity": "ten"}]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid portfolio data");
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_timeout_is_gateway_timeout() {
        let model = Arc::new(FakeModel::replying(FakeReply::Fail(|| GeminiError::Timeout)));
        let app = router(model_state(model));

        let (status, json) = send(app, post_json("/analyze", PORTFOLIO)).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["message"], "Gemini API timed out. Try again.");
    }

    #[tokio::test]
    async fn test_analyze_upstream_error_is_bad_gateway() {
        let model = Arc::new(FakeModel::replying(FakeReply::Fail(|| GeminiError::Status(503))));
        let app = router(model_state(model));

        let (status, json) = send(app, post_json("/analyze", PORTFOLIO)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["message"], "Failed to contact Gemini API");
    }

    #[tokio::test]
    async fn test_analyze_unexpected_shape_uses_fallback() {
        let model = Arc::new(FakeModel::replying(FakeReply::NoCandidates));
        let app = router(model_state(model));

        let (status, json) = send(app, post_json("/analyze", PORTFOLIO)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["analysis"],
            "Unable to generate analysis - unexpected API response"
        );
    }
}
