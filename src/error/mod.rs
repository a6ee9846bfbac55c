use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Model error: {0}")]
    Llm(#[from] LlmError),

    #[error("{0}")]
    Response(#[from] ResponseError),

    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    #[error("{0}")]
    Tool(#[from] ToolError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Hosted table error: {status} - {message}")]
    Hosted { status: u16, message: String },

    #[error("Session content could not be decoded: {0}")]
    Content(#[from] serde_json::Error),

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Hosted model API errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a model completion was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseFailure {
    #[error("completion was empty")]
    Empty,

    #[error("completion is not valid JSON: {message}")]
    Malformed { message: String },

    #[error("completion does not match the expected shape: {message}")]
    Shape { message: String },
}

/// A completion that could not be turned into the expected schema.
///
/// Never retried: the caller surfaces it as an invalid response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {schema} response: {reason}")]
pub struct ResponseError {
    pub schema: &'static str,
    pub reason: ResponseFailure,
}

/// MCP protocol errors
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("Invalid parameters for {tool_name}: {message}")]
    InvalidParameters { tool_name: String, message: String },

    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Input and workflow errors raised before any network interaction
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Could not read {path}: {message}")]
    Io { path: String, message: String },
}

impl ToolError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        McpError::ExecutionFailed {
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for McpError {
    fn from(err: StorageError) -> Self {
        AppError::from(err).into()
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for hosted model operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Result type alias for MCP operations
pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "GEMINI_API_KEY is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Configuration error: GEMINI_API_KEY is required"
        );

        let err = AppError::Internal {
            message: "unexpected".to_string(),
        };
        assert_eq!(err.to_string(), "Internal error: unexpected");
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::SessionNotFound {
            session_id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Session not found: 42");

        let err = StorageError::Hosted {
            status: 401,
            message: "JWT expired".to_string(),
        };
        assert_eq!(err.to_string(), "Hosted table error: 401 - JWT expired");

        let err = StorageError::Migration {
            message: "version mismatch".to_string(),
        };
        assert_eq!(err.to_string(), "Migration failed: version mismatch");
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::Api {
            status: 503,
            message: "The model is overloaded.".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - The model is overloaded.");

        let err = LlmError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");
    }

    #[test]
    fn test_response_error_display() {
        let err = ResponseError {
            schema: "AIResponse",
            reason: ResponseFailure::Shape {
                message: "missing field `recommendedFrameworks`".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Invalid AIResponse response: completion does not match the expected shape: missing field `recommendedFrameworks`"
        );

        let err = ResponseError {
            schema: "FinalSolution",
            reason: ResponseFailure::Empty,
        };
        assert_eq!(
            err.to_string(),
            "Invalid FinalSolution response: completion was empty"
        );
    }

    #[test]
    fn test_tool_error_is_shown_unprefixed() {
        let err: AppError = ToolError::validation("file", "File size exceeds 1MB limit.").into();
        assert_eq!(
            err.to_string(),
            "Validation failed: file - File size exceeds 1MB limit."
        );
    }

    #[test]
    fn test_app_error_conversion_to_mcp_error() {
        let app_err = AppError::Config {
            message: "test error".to_string(),
        };
        let mcp_err: McpError = app_err.into();
        assert!(matches!(mcp_err, McpError::ExecutionFailed { .. }));
        assert!(mcp_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_sub_errors_convert_to_app_error() {
        let app_err: AppError = StorageError::SessionNotFound {
            session_id: "x".to_string(),
        }
        .into();
        assert!(matches!(app_err, AppError::Storage(_)));

        let app_err: AppError = LlmError::Timeout { timeout_ms: 1000 }.into();
        assert!(matches!(app_err, AppError::Llm(_)));

        let app_err: AppError = McpError::UnknownTool {
            tool_name: "nope".to_string(),
        }
        .into();
        assert!(matches!(app_err, AppError::Mcp(_)));
    }
}
