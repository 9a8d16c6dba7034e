/// Failure below HTTP status level: the request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("no network connection")]
    Offline,
    #[error("network error: {0}")]
    Network(String),
}

/// Typed outcome reported to the caller when a request fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("request timed out")]
    Timeout,
    #[error("no network connection")]
    Offline,
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("network error: {0}")]
    Network(String),
}

impl ServiceError {
    /// Timeouts and generic network failures get one automatic retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_))
    }
}

impl From<TransportError> for ServiceError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => Self::Timeout,
            TransportError::Offline => Self::Offline,
            TransportError::Network(msg) => Self::Network(msg),
        }
    }
}
