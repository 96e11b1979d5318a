use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Identity required: {0}")]
    IdentityRequired(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rejected by endpoint: {0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Text shown to the user when an operation fails.
    ///
    /// Failures the user cannot act on are logged here and collapsed into a
    /// generic message.
    pub fn user_message(&self) -> String {
        match self {
            AppError::IdentityRequired(_) => "Enter your name first".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::ExternalServiceError(ref msg) => {
                tracing::error!("External service error: {}", msg);
                "The file service is unreachable".to_string()
            }
            AppError::InvalidResponse(ref msg) => {
                tracing::error!("Invalid response: {}", msg);
                "The file service returned an unexpected response".to_string()
            }
            AppError::Rejected(msg) => format!("The file service refused the request: {}", msg),
            AppError::NotFound(_) => "File not found".to_string(),
            AppError::Forbidden(_) => "You are not allowed to do that".to_string(),
            AppError::Decode(ref e) => {
                tracing::error!("Payload decode error: {:?}", e);
                "The downloaded file is corrupted".to_string()
            }
            AppError::Io(e) => format!("Local file error: {}", e),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal error".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
