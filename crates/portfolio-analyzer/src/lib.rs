//! Portfolio metrics and prompt construction for the AI analysis endpoints.

pub mod metrics;
pub mod models;
pub mod prompt;

pub use metrics::{compute_metrics, PortfolioError, PortfolioMetrics};
pub use models::{AnalyzeRequest, PortfolioItem};
pub use prompt::{analysis_prompt, chat_prompt, holdings_text};
