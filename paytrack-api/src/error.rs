/// Error handling for the API server
///
/// A unified error type mapping the domain error taxonomy onto HTTP
/// responses. Handlers return `Result<T, ApiError>`; the `IntoResponse`
/// impl produces the status code and JSON body.
///
/// Storage failures are wrapped: the detail is logged, the client receives
/// a generic 500 body. Authentication failures carry a machine-readable
/// code so clients can distinguish expired from revoked from missing
/// tokens, while credential failures stay deliberately generic.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use paytrack_shared::auth::{jwt::JwtError, password::PasswordError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Generic message for 500 responses; detail never reaches the client
const SERVER_ERROR_MESSAGE: &str = "Internal error, could not complete operation.";

/// Machine-readable token failure codes (all map to 401)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCode {
    /// Token past its expiry
    TokenExpired,

    /// Bad signature, bad structure, or wrong token type
    TokenInvalid,

    /// No token supplied where one is required
    TokenMissing,

    /// Access token was minted through refresh and the operation requires
    /// freshly verified credentials
    TokenNotFresh,

    /// Token's jti is on the blocklist
    TokenRevoked,
}

impl TokenCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCode::TokenExpired => "token_expired",
            TokenCode::TokenInvalid => "token_invalid",
            TokenCode::TokenMissing => "token_missing",
            TokenCode::TokenNotFresh => "token_not_fresh",
            TokenCode::TokenRevoked => "token_revoked",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            TokenCode::TokenExpired => "Token has expired.",
            TokenCode::TokenInvalid => "Token is invalid.",
            TokenCode::TokenMissing => "Authorization token is missing.",
            TokenCode::TokenNotFresh => "Fresh token required.",
            TokenCode::TokenRevoked => "Token has been revoked.",
        }
    }
}

/// Field-level validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request (400)
    BadRequest(String),

    /// Request validation failed (400, field-level detail preserved)
    Validation(Vec<FieldError>),

    /// Domain-level unique-constraint violation, e.g. username taken (400)
    Duplicate(String),

    /// Bad credentials (401, deliberately generic)
    Unauthorized(String),

    /// Token failure (401 with machine-readable code)
    Token(TokenCode),

    /// No matching record (404, generic message)
    NotFound(String),

    /// Storage or unexpected failure (500, generic message)
    Internal(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code, e.g. "not_found", "token_revoked"
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Field-level validation errors, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "bad request: {msg}"),
            ApiError::Validation(errors) => write!(f, "validation failed: {} errors", errors.len()),
            ApiError::Duplicate(msg) => write!(f, "duplicate: {msg}"),
            ApiError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            ApiError::Token(code) => write!(f, "token error: {}", code.as_str()),
            ApiError::NotFound(msg) => write!(f, "not found: {msg}"),
            ApiError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed.".to_string(),
                Some(errors),
            ),
            ApiError::Duplicate(msg) => (StatusCode::BAD_REQUEST, "duplicate", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Token(code) => (
                StatusCode::UNAUTHORIZED,
                code.as_str(),
                code.message().to_string(),
                None,
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Internal(msg) => {
                // Log the detail, never expose it
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    SERVER_ERROR_MESSAGE.to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique-constraint violations surface as domain duplicates, foreign-key
/// violations as a generic 400; everything else is an internal error with
/// a generic client message. Constraint names never reach the client.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found.".to_string()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    if db_err.constraint().is_some_and(|c| c.contains("user_name")) {
                        ApiError::Duplicate("Username already exists.".to_string())
                    } else {
                        ApiError::Duplicate("Record already exists.".to_string())
                    }
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    ApiError::BadRequest("Referenced record does not exist.".to_string())
                }
                _ => ApiError::Internal(format!("database error: {db_err}")),
            },
            _ => ApiError::Internal(format!("database error: {err}")),
        }
    }
}

/// Convert JWT errors to API errors with the matching token code
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Token(TokenCode::TokenExpired),
            JwtError::Invalid(_) | JwtError::WrongType { .. } => {
                ApiError::Token(TokenCode::TokenInvalid)
            }
            JwtError::Create(msg) => ApiError::Internal(format!("token creation failed: {msg}")),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("password operation failed: {err}"))
    }
}

/// Convert validator output to field-level 400s
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors: Vec<FieldError> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::Validation(errors)
    }
}
