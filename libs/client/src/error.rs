use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the stored credentials; they have been cleared
    #[error("Not signed in")]
    Unauthorized,

    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (connect failure, timeout)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pricing error: {0}")]
    Pricing(#[from] domain_pricing::PricingError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Whether the failure means the server could not be reached, so the
    /// mutation should be kept locally and replayed later
    pub fn is_offline(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    /// The server understood the request and refused it for good (a 4xx other
    /// than 401, 408 or 429). Retrying the same request cannot succeed.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            ClientError::Api { status, .. }
                if (400..500).contains(status) && !matches!(status, 401 | 408 | 429)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ClientError::Network(err)
        } else {
            ClientError::Http(err)
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> ClientError {
        ClientError::Api {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn test_client_errors_are_rejections() {
        assert!(api(400).is_rejected());
        assert!(api(404).is_rejected());
        assert!(api(403).is_rejected());
    }

    #[test]
    fn test_retryable_errors_are_not_rejections() {
        assert!(!api(408).is_rejected());
        assert!(!api(429).is_rejected());
        assert!(!api(500).is_rejected());
        assert!(!api(503).is_rejected());
        assert!(!ClientError::Unauthorized.is_rejected());
        assert!(!ClientError::Storage("disk full".to_string()).is_rejected());
    }
}
