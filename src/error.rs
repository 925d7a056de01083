use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field that failed tool-argument validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Main error type for the orchestrator
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation failed for tool `{tool}`: {}", describe_fields(.errors))]
    Validation {
        tool: String,
        errors: Vec<FieldError>,
    },

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid function call: {0}")]
    InvalidFunctionCall(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Context length exceeded: {0}")]
    ContextLength(String),

    #[error("Maximum iterations exceeded: {0}")]
    MaxIterations(usize),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    pub fn validation(tool: impl Into<String>, errors: Vec<FieldError>) -> Self {
        AgentError::Validation {
            tool: tool.into(),
            errors,
        }
    }

    /// Whether the fallback chain may retry this failure on another model
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::RateLimit { .. }
                | AgentError::Timeout(_)
                | AgentError::Network(_)
                | AgentError::Unknown(_)
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::Config(_) => "CONFIG_ERROR",
            AgentError::Authentication(_) => "AUTHENTICATION_ERROR",
            AgentError::InvalidRequest(_) => "INVALID_REQUEST",
            AgentError::Serialization(_) => "SERIALIZATION_ERROR",
            AgentError::Validation { .. } => "VALIDATION_ERROR",
            AgentError::ToolExecution(_) => "TOOL_EXECUTION_ERROR",
            AgentError::ToolNotFound(_) => "TOOL_NOT_FOUND",
            AgentError::InvalidFunctionCall(_) => "INVALID_FUNCTION_CALL",
            AgentError::Timeout(_) => "TIMEOUT_ERROR",
            AgentError::Network(_) => "NETWORK_ERROR",
            AgentError::ContextLength(_) => "CONTEXT_LENGTH_EXCEEDED",
            AgentError::MaxIterations(_) => "MAX_ITERATIONS_EXCEEDED",
            AgentError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            AgentError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// HTTP status this error maps to at the server boundary
    pub fn status_code(&self) -> u16 {
        match self {
            AgentError::InvalidRequest(_) | AgentError::Validation { .. } => 400,
            AgentError::Authentication(_) => 401,
            AgentError::ContextLength(_) => 413,
            AgentError::RateLimit { .. } => 429,
            _ => 500,
        }
    }

    /// Convert to a structured error payload. Client-shape rejections carry
    /// the bare message on the wire; the prefixed Display form is for logs.
    pub fn to_error_payload(&self) -> serde_json::Value {
        let message = match self {
            AgentError::InvalidRequest(message) => message.clone(),
            other => other.to_string(),
        };
        let mut payload = serde_json::json!({
            "error": message,
            "code": self.error_code(),
            "retryable": self.is_retryable(),
        });

        if let AgentError::Validation { errors, .. } = self {
            if let Ok(fields) = serde_json::to_value(errors) {
                payload["fieldErrors"] = fields;
            }
        }

        if let AgentError::RateLimit { retry_after } = self {
            payload["retryAfter"] = serde_json::json!(retry_after);
        }

        payload
    }
}

fn describe_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classifications() {
        assert!(AgentError::RateLimit { retry_after: 5 }.is_retryable());
        assert!(AgentError::Timeout("t".into()).is_retryable());
        assert!(AgentError::Network("n".into()).is_retryable());
        assert!(AgentError::Unknown("u".into()).is_retryable());
        assert!(!AgentError::ContextLength("c".into()).is_retryable());
        assert!(!AgentError::Authentication("a".into()).is_retryable());
        assert!(!AgentError::Config("cfg".into()).is_retryable());
    }

    #[test]
    fn status_codes_follow_classification() {
        assert_eq!(AgentError::InvalidRequest("bad".into()).status_code(), 400);
        assert_eq!(AgentError::Authentication("key".into()).status_code(), 401);
        assert_eq!(AgentError::ContextLength("long".into()).status_code(), 413);
        assert_eq!(AgentError::RateLimit { retry_after: 1 }.status_code(), 429);
        assert_eq!(AgentError::Unknown("x".into()).status_code(), 500);
    }

    #[test]
    fn validation_payload_carries_field_errors() {
        let err = AgentError::validation(
            "selectTimingAndDuration",
            vec![FieldError::new("duration", "must be between 1 and 4")],
        );
        let payload = err.to_error_payload();
        assert_eq!(payload["code"], "VALIDATION_ERROR");
        assert_eq!(payload["retryable"], false);
        assert_eq!(payload["fieldErrors"][0]["field"], "duration");
    }

    #[test]
    fn invalid_request_payload_carries_the_bare_message() {
        let err = AgentError::InvalidRequest("Invalid messages format".into());
        // Display keeps the prefix for logs, the wire payload does not.
        assert_eq!(err.to_string(), "Invalid request: Invalid messages format");
        assert_eq!(err.to_error_payload()["error"], "Invalid messages format");
    }
}
