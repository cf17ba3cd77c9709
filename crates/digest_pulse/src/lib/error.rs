#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(&'static str),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
