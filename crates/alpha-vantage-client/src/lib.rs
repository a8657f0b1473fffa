pub mod alpha_vantage;

pub use alpha_vantage::{AlphaVantageClient, DEFAULT_BASE_URL};
