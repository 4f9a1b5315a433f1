use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to load ranking data: {message}")]
    FetchError { status: Option<u16>, message: String },

    #[error("Failed to save ranking: {message}")]
    PersistenceError { status: Option<u16>, message: String },

    #[error("Authentication expired")]
    AuthExpired,

    #[error("No active session")]
    NotAuthenticated,

    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Invalid ranking: {reason}")]
    InvalidRanking { reason: String },

    #[error("Save is not available: {reason}")]
    SaveDisabled { reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Persistence,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::FetchError { .. } | ClientError::Api { .. } | ClientError::Http(_) => {
                ErrorCategory::Network
            }
            ClientError::AuthExpired
            | ClientError::NotAuthenticated
            | ClientError::InvalidCredentials { .. } => ErrorCategory::Authentication,
            ClientError::PersistenceError { .. } | ClientError::SaveDisabled { .. } => {
                ErrorCategory::Persistence
            }
            ClientError::MalformedResponse { .. }
            | ClientError::InvalidRanking { .. }
            | ClientError::SerializationError(_) => ErrorCategory::Data,
            ClientError::ConfigError { .. }
            | ClientError::ConfigValidationError { .. }
            | ClientError::InvalidConfigValueError { .. }
            | ClientError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ClientError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClientError::SaveDisabled { .. } => ErrorSeverity::Low,
            ClientError::PersistenceError { .. }
            | ClientError::Api { .. }
            | ClientError::Http(_)
            | ClientError::AuthExpired
            | ClientError::NotAuthenticated
            | ClientError::InvalidCredentials { .. } => ErrorSeverity::Medium,
            ClientError::FetchError { .. }
            | ClientError::MalformedResponse { .. }
            | ClientError::InvalidRanking { .. }
            | ClientError::SerializationError(_) => ErrorSeverity::High,
            ClientError::ConfigError { .. }
            | ClientError::ConfigValidationError { .. }
            | ClientError::InvalidConfigValueError { .. }
            | ClientError::MissingConfigError { .. }
            | ClientError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Failures after which the same call may simply be repeated with the
    /// in-memory state intact.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClientError::PersistenceError { .. }
                | ClientError::SaveDisabled { .. }
                | ClientError::Api { .. }
                | ClientError::Http(_)
        )
    }

    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, ClientError::AuthExpired | ClientError::NotAuthenticated)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::FetchError { status, .. } | ClientError::PersistenceError { status, .. } => {
                *status
            }
            ClientError::Api { status, .. } => Some(*status),
            ClientError::AuthExpired => Some(401),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::FetchError { message, .. } => {
                format!("Could not load the tracks: {}", message)
            }
            ClientError::PersistenceError { message, .. } => {
                format!("Could not save your ranking: {}", message)
            }
            ClientError::AuthExpired => "Your session has expired. Please log in again.".to_string(),
            ClientError::NotAuthenticated => "You are not logged in.".to_string(),
            ClientError::InvalidCredentials { message } => message.clone(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::MalformedResponse { endpoint, .. } => {
                format!("The server sent an unexpected response for {}", endpoint)
            }
            ClientError::InvalidRanking { reason } => format!("The ranking is invalid: {}", reason),
            ClientError::SaveDisabled { reason } => format!("Saving is disabled: {}", reason),
            ClientError::Http(_) => "Network error. Is the API server reachable?".to_string(),
            ClientError::IoError(e) => format!("File system error: {}", e),
            ClientError::SerializationError(_) => "Could not encode or decode data".to_string(),
            ClientError::ConfigError { message } => format!("Configuration problem: {}", message),
            ClientError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            ClientError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            ClientError::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the API base URL and that the server is running, then reload",
            ErrorCategory::Authentication => "Log in again to obtain a fresh session",
            ErrorCategory::Persistence => "Your ordering is kept; try saving again",
            ErrorCategory::Data => "The server response did not match the expected schema; check the API version",
            ErrorCategory::Configuration => "Fix the configuration file or command-line options",
            ErrorCategory::System => "Check file permissions and paths",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_is_recoverable() {
        let err = ClientError::PersistenceError {
            status: Some(500),
            message: "boom".to_string(),
        };
        assert!(err.is_recoverable());
        assert!(!err.requires_reauthentication());
        assert_eq!(err.category(), ErrorCategory::Persistence);
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_fetch_error_is_terminal() {
        let err = ClientError::FetchError {
            status: Some(500),
            message: "boom".to_string(),
        };
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("boom"));
    }

    #[test]
    fn test_auth_expired_requires_reauthentication() {
        let err = ClientError::AuthExpired;
        assert!(err.requires_reauthentication());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.category(), ErrorCategory::Authentication);
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = ClientError::MissingConfigError {
            field: "api.base_url".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("api.base_url"));
    }
}
