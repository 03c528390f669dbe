//! Error types for the prioritizer crate.

use thiserror::Error;

/// Every failure the prioritizer can surface.
///
/// Setup errors abort the whole run before any list is touched; everything
/// else is scoped to the list being processed when it occurred.
#[derive(Error, Debug, Clone)]
pub enum PrioritizerError {
    // Setup errors
    #[error("Failed to read credentials file '{path}': {reason}")]
    CredentialsUnreadable { path: String, reason: String },

    #[error("Invalid service account credentials: {reason}")]
    InvalidCredentials { reason: String },

    #[error("{var} environment variable is not set")]
    MissingApiKey { var: String },

    #[error("Token exchange failed: {reason}")]
    TokenExchange { reason: String },

    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    // List resolution
    #[error("Task list '{title}' not found")]
    ListNotFound { title: String },

    // Store errors
    #[error("Task store request failed: {reason}")]
    Store { reason: String },

    #[error("Task store API error ({status}): {message}")]
    StoreApi { status: u16, message: String },

    #[error("Task '{task_id}' not found in list '{list_id}'")]
    TaskNotFound { list_id: String, task_id: String },

    #[error("Failed to move task '{task_id}' in list '{list}': {reason}")]
    MoveFailed {
        task_id: String,
        list: String,
        reason: String,
    },

    #[error("Failed to create subtask '{title}' under '{parent_id}': {reason}")]
    InsertFailed {
        parent_id: String,
        title: String,
        reason: String,
    },

    // Inference errors
    #[error("AI error: {0}")]
    Ai(String),

    #[error("Failed to parse AI response: {reason}\nResponse was: {response}")]
    AiResponseParse { reason: String, response: String },

    #[error("Received incorrect number of {kind}: got {got}, want {expected}")]
    RecordCountMismatch {
        kind: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("AI response references unknown task '{task_id}'")]
    UnknownTask { task_id: String },

    #[error("AI response lists task '{task_id}' more than once")]
    DuplicateTask { task_id: String },

    // General errors
    #[error("Failed to parse JSON: {reason}")]
    JsonParseError { reason: String },

    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl PrioritizerError {
    /// Whether this error happened before any list work could start.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::CredentialsUnreadable { .. }
                | Self::InvalidCredentials { .. }
                | Self::MissingApiKey { .. }
                | Self::TokenExchange { .. }
                | Self::ConfigError { .. }
        )
    }
}

impl From<std::io::Error> for PrioritizerError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PrioritizerError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParseError {
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for PrioritizerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Store {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for prioritizer operations
pub type PrioritizerResult<T> = Result<T, PrioritizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrioritizerError::ListNotFound {
            title: "Backlog".to_string(),
        };
        assert_eq!(err.to_string(), "Task list 'Backlog' not found");
    }

    #[test]
    fn test_parse_error_keeps_response_text() {
        let err = PrioritizerError::AiResponseParse {
            reason: "expected value at line 1 column 1".to_string(),
            response: "Sure! Here are your tasks".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("expected value"));
        assert!(msg.contains("Response was: Sure! Here are your tasks"));
    }

    #[test]
    fn test_count_mismatch_display() {
        let err = PrioritizerError::RecordCountMismatch {
            kind: "priorities",
            expected: 3,
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "Received incorrect number of priorities: got 2, want 3"
        );
    }

    #[test]
    fn test_setup_classification() {
        assert!(PrioritizerError::MissingApiKey {
            var: "GEMINI_API_KEY".to_string()
        }
        .is_setup());
        assert!(!PrioritizerError::ListNotFound {
            title: "x".to_string()
        }
        .is_setup());
        assert!(!PrioritizerError::Ai("quota".to_string()).is_setup());
    }
}
