use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrderingError>;

#[derive(Debug, Error)]
pub enum OrderingError {
    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Gateway failure: {0}")]
    GatewayFailure(String),

    #[error("Container {0} has an unconfirmed operation in flight")]
    ContainerBusy(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl OrderingError {
    /// Whether the remote side rejected or never answered the request
    pub fn is_gateway_failure(&self) -> bool {
        matches!(self, Self::GatewayFailure(_))
    }
}

impl From<reqwest::Error> for OrderingError {
    fn from(err: reqwest::Error) -> Self {
        Self::GatewayFailure(err.to_string())
    }
}
