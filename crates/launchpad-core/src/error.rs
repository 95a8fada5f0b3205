use thiserror::Error;

/// Core error type for Launchpad
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Transport failure talking to the launch data provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The launch data provider answered with a non-success status
    #[error("Launch data download failed with status {status}: {body}")]
    FetchError {
        /// HTTP status code returned by the provider
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// A raw provider document could not be turned into a launch record
    #[error("Normalization error for document {}: {reason}", describe_flight(.flight_number))]
    NormalizationError {
        /// Flight number of the document, when it carried one
        flight_number: Option<i64>,
        /// What was missing or malformed
        reason: String,
    },

    /// The requested target planet is not known
    #[error("No matching planet found: {0}")]
    UnknownTargetError(String),

    /// Caller input failed validation
    #[error("{0}")]
    ValidationError(String),

    /// State store error
    #[error("State store error: {0}")]
    StateStoreError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn describe_flight(flight_number: &Option<i64>) -> String {
    match flight_number {
        Some(n) => n.to_string(),
        None => "<unknown>".to_string(),
    }
}

/// Result alias used across Launchpad
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Build a normalization error
    pub fn normalization(flight_number: Option<i64>, reason: impl Into<String>) -> Self {
        CoreError::NormalizationError {
            flight_number,
            reason: reason.into(),
        }
    }

    /// Whether a retry of the failed fetch may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::NetworkError(_) => true,
            CoreError::FetchError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}
