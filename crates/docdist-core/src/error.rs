//! Error types module
//!
//! Every fallible step of the document flow (argument checks, credential
//! exchange, block upload, gateway calls) reports through the single
//! `DocumentError` taxonomy. Gateway responses are mapped onto it by the
//! response classifier in `docdist-client`; storage failures arrive as
//! `TransportFailure`.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for caller mistakes detected before any network call
    Debug,
    /// Warning level - for classified rejections from the gateway
    Warn,
    /// Error level - for unexpected or transport failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("You don't have permission to upload")]
    PermissionDenied { status: u16, detail: String },

    #[error("Unauthorized")]
    Unauthorized { detail: String },

    #[error("BadRequest")]
    ValidationFailed { detail: String },

    #[error("{message}")]
    NotFound { message: String, detail: String },

    #[error("{message}")]
    Unexpected {
        message: String,
        status: u16,
        detail: String,
    },

    #[error("Upload failed: {0}")]
    TransportFailure(String),

    #[error("Unable to issue an authorization token: {0}")]
    TokenIssuance(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

impl From<validator::ValidationErrors> for DocumentError {
    fn from(err: validator::ValidationErrors) -> Self {
        DocumentError::InvalidArgument(format!("Validation error: {}", err))
    }
}

impl From<uuid::Error> for DocumentError {
    fn from(err: uuid::Error) -> Self {
        DocumentError::InvalidArgument(format!("UUID parsing error: {}", err))
    }
}

impl DocumentError {
    /// Stable name of the error kind
    pub fn error_type(&self) -> &'static str {
        match self {
            DocumentError::InvalidArgument(_) => "InvalidArgument",
            DocumentError::PermissionDenied { .. } => "PermissionDenied",
            DocumentError::Unauthorized { .. } => "Unauthorized",
            DocumentError::ValidationFailed { .. } => "ValidationFailed",
            DocumentError::NotFound { .. } => "NotFound",
            DocumentError::Unexpected { .. } => "Unexpected",
            DocumentError::TransportFailure(_) => "TransportFailure",
            DocumentError::TokenIssuance(_) => "TokenIssuance",
            DocumentError::Cancelled => "Cancelled",
        }
    }

    /// HTTP status that produced this error, when it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DocumentError::PermissionDenied { status, .. } => Some(*status),
            DocumentError::Unauthorized { .. } => Some(401),
            DocumentError::ValidationFailed { .. } => Some(400),
            DocumentError::NotFound { .. } => Some(404),
            DocumentError::Unexpected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Supplementary detail, usually the raw response body.
    pub fn detail(&self) -> Option<&str> {
        match self {
            DocumentError::PermissionDenied { detail, .. }
            | DocumentError::Unauthorized { detail }
            | DocumentError::ValidationFailed { detail }
            | DocumentError::NotFound { detail, .. }
            | DocumentError::Unexpected { detail, .. } => Some(detail.as_str()),
            _ => None,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            DocumentError::InvalidArgument(_) | DocumentError::Cancelled => LogLevel::Debug,
            DocumentError::PermissionDenied { .. }
            | DocumentError::Unauthorized { .. }
            | DocumentError::ValidationFailed { .. }
            | DocumentError::NotFound { .. } => LogLevel::Warn,
            DocumentError::Unexpected { .. }
            | DocumentError::TransportFailure(_)
            | DocumentError::TokenIssuance(_) => LogLevel::Error,
        }
    }

    /// Message plus detail, for operators reading CLI output or logs.
    pub fn detailed_message(&self) -> String {
        match self.detail() {
            Some(detail) if !detail.trim().is_empty() => {
                format!("{}\n  Detail: {}", self, detail.trim_end())
            }
            _ => self.to_string(),
        }
    }
}
