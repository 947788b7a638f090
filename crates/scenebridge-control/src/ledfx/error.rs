use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedFxError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}
