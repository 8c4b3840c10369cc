use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Malformed payload or business rule violation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Payment mode outside the three recognised values
    #[error("Invalid payment mode: {0}")]
    InvalidPaymentMode(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A paid installment cannot leave the paid state
    #[error("Illegal status transition from '{from}' to '{to}'")]
    IllegalStatusTransition { from: String, to: String },

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn illegal_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        AppError::IllegalStatusTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Stable error code exposed to callers
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::Json(_) => "validation",
            AppError::InvalidPaymentMode(_) => "invalid_payment_mode",
            AppError::NotFound(_) => "not_found",
            AppError::IllegalStatusTransition { .. } => "illegal_status_transition",
            AppError::Database(_) => "storage",
            AppError::Configuration(_) => "configuration",
            AppError::Internal(_) => "internal",
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(kind = self.kind(), "Request failed: {}", self);
        }

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "code": status_code.as_u16(),
                "kind": self.kind(),
                "message": self.to_string(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidPaymentMode(_) => StatusCode::BAD_REQUEST,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::IllegalStatusTransition { .. } => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
