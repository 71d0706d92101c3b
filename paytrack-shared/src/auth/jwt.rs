/// JWT token generation and validation
///
/// Tokens are signed with HS256 (HMAC-SHA256) and carry the user id as
/// subject plus a unique token identifier (`jti`) used as the revocation
/// key by the blocklist.
///
/// # Token Types
///
/// - **Access Token**: short-lived (15 minutes), authenticates API calls.
///   Access tokens issued directly from a password login are *fresh*;
///   tokens minted through the refresh flow are not, and are rejected by
///   operations that require freshly verified credentials.
/// - **Refresh Token**: long-lived (30 days), exchanged for new access
///   tokens.
///
/// # Example
///
/// ```
/// use paytrack_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(42, TokenType::Access, true);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!")?;
///
/// let validated = validate_token(&token, "secret-key-at-least-32-bytes-long!")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim carried by every token
const ISSUER: &str = "paytrack";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("failed to create token: {0}")]
    Create(String),

    /// Token has expired
    #[error("token has expired")]
    Expired,

    /// Signature, structure, or issuer check failed
    #[error("invalid token: {0}")]
    Invalid(String),

    /// Token is of the wrong type for the operation
    #[error("expected {expected} token")]
    WrongType { expected: &'static str },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived)
    Access,

    /// Refresh token (long-lived)
    Refresh,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::minutes(15),
            TokenType::Refresh => Duration::days(30),
        }
    }

    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims structure
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`, `nbf`, `jti`) plus two
/// custom claims: `token_type` (access/refresh) and `fresh` (whether the
/// access token was issued directly from a password login).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: i64,

    /// Issuer - always "paytrack"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Unique token identifier, the revocation key
    pub jti: Uuid,

    /// Token type (custom claim)
    pub token_type: TokenType,

    /// Fresh flag (custom claim); always false for refresh tokens
    pub fresh: bool,
}

impl Claims {
    /// Creates new claims with the default expiration for the token type
    ///
    /// A new `jti` is generated for every call, so two tokens issued for
    /// the same user are always revocable independently.
    pub fn new(user_id: i64, token_type: TokenType, fresh: bool) -> Self {
        Self::with_expiration(user_id, token_type, fresh, token_type.default_expiration())
    }

    /// Creates claims with a custom expiration
    pub fn with_expiration(
        user_id: i64,
        token_type: TokenType,
        fresh: bool,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4(),
            token_type,
            fresh: fresh && token_type == TokenType::Access,
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 with the provided secret. The secret should
/// be at least 32 bytes and supplied from the environment, never hardcoded.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| JwtError::Create(format!("token encoding failed: {e}")))
}

/// Validates a JWT token and extracts its claims
///
/// Verifies the signature, expiry, not-before time, and issuer. Blocklist
/// membership is checked separately by the caller, after this succeeds.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(format!("token validation failed: {e}")),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and checks it is an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Access {
        return Err(JwtError::WrongType { expected: "access" });
    }

    Ok(claims)
}

/// Validates a token and checks it is a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::WrongType { expected: "refresh" });
    }

    Ok(claims)
}

/// Issues the fresh access + refresh token pair for a password login
///
/// Both tokens carry the same subject but distinct `jti` values.
pub fn issue_login_tokens(user_id: i64, secret: &str) -> Result<(String, String), JwtError> {
    let access_claims = Claims::new(user_id, TokenType::Access, true);
    let refresh_claims = Claims::new(user_id, TokenType::Refresh, false);

    let access_token = create_token(&access_claims, secret)?;
    let refresh_token = create_token(&refresh_claims, secret)?;

    Ok((access_token, refresh_token))
}

/// Mints a non-fresh access token for an already-validated refresh subject
///
/// The caller is responsible for validating the refresh token (including
/// the blocklist check) before invoking this.
pub fn issue_refreshed_access_token(user_id: i64, secret: &str) -> Result<String, JwtError> {
    let claims = Claims::new(user_id, TokenType::Access, false);
    create_token(&claims, secret)
}
