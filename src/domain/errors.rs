use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Customer identity unavailable")]
    Identity,
    #[error("Invalid quantity for product {product_id}: {message}")]
    Validation { product_id: i64, message: String },
    #[error("Cart rejected item: {0}")]
    Submission(String),
    #[error("Malformed row: {0}")]
    Data(String),
}

impl WidgetError {
    /// Config and transport failures degrade to a "temporarily unavailable"
    /// state instead of being shown to the shopper.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, WidgetError::Config(_) | WidgetError::Network(_))
    }

    /// True for a non-2xx response whose status was 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WidgetError::Network(msg) if msg.contains("status 404"))
    }
}
