use async_trait::async_trait;
use std::time::Duration;

use crate::content::GenerateContentResponse;
use crate::error::GeminiResult;

/// Backend-agnostic interface for single-turn text generation.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Whether credentials are present; callers may refuse work up front when not.
    fn is_configured(&self) -> bool;

    async fn generate_content(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> GeminiResult<GenerateContentResponse>;
}
