use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Gemini API key not configured")]
    MissingApiKey,

    #[error("Timeout")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GeminiError {
    /// The request URL carries the API key, so it is dropped from the message.
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            GeminiError::Timeout
        } else if e.is_decode() {
            GeminiError::Decode(e.to_string())
        } else {
            GeminiError::Request(e.to_string())
        }
    }
}

pub type GeminiResult<T> = Result<T, GeminiError>;
