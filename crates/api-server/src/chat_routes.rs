//! Chat API Routes
//!
//! Single-turn proxy from the front end's chat box to the generative model.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use gemini_client::GeminiError;
use portfolio_analyzer::chat_prompt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::AppState;

const CHAT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub enum ChatError {
    NoMessage,
    Upstream(GeminiError),
    UnexpectedResponse,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let (status, reply) = match self {
            ChatError::NoMessage => (StatusCode::BAD_REQUEST, "No message received."),
            ChatError::Upstream(e) => {
                tracing::error!("Gemini request error: {}", e);
                (StatusCode::BAD_GATEWAY, "Failed to contact Gemini API.")
            }
            ChatError::UnexpectedResponse => {
                tracing::error!("Gemini response had no candidate text");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong on the server.",
                )
            }
        };

        (
            status,
            Json(ChatResponse {
                reply: reply.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let message = payload
        .ok()
        .and_then(|Json(req)| req.message)
        .filter(|m| !m.is_empty())
        .ok_or(ChatError::NoMessage)?;

    let response = state
        .gemini
        .generate_content(&chat_prompt(&message), CHAT_TIMEOUT)
        .await
        .map_err(ChatError::Upstream)?;

    let reply = response
        .first_text()
        .ok_or(ChatError::UnexpectedResponse)?
        .to_string();

    Ok(Json(ChatResponse { reply }))
}
