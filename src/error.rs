use thiserror::Error;

/// Bidder error types
#[derive(Error, Debug)]
pub enum BidderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("State file error: {0}")]
    State(String),

    #[error("Market data error: {0}")]
    Market(String),

    #[error("Scheduling error: {0}")]
    Schedule(String),

    #[error("Offer error: {0}")]
    Offer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timestamp error: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// Result type for bidder operations
pub type Result<T> = std::result::Result<T, BidderError>;
