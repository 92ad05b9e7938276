//! Error types for listpull

use thiserror::Error;

/// Unified error type for listpull operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed (network error, TLS, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse a JSON payload
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// Card-data source returned an error object
    #[error("{code}: {details}")]
    ApiResponse { code: String, details: String },

    /// A queued provider call did not finish in time
    #[error("Request to {0} timed out")]
    Timeout(String),

    /// Provider lacks the requested capability
    #[error("{0} does not support {1}")]
    Unsupported(&'static str, &'static str),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Line item not found: {0}")]
    LineItemNotFound(i64),

    /// Found quantity larger than what the customer asked for
    #[error("Quantity found {found} exceeds requested quantity {requested}")]
    QuantityOutOfRange { found: u32, requested: u32 },

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Condition \"{0}\" is already listed for this card")]
    DuplicateCondition(String),

    #[error("No condition variant at index {0}")]
    VariantIndex(usize),

    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Notification failed: {0}")]
    Notification(String),
}

/// Result alias for listpull operations
pub type Result<T> = std::result::Result<T, Error>;
