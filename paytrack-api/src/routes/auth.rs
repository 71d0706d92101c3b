/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /register` - Register a new staff user
/// - `POST /login` - Verify credentials, issue access + refresh tokens
/// - `POST /logout` - Revoke the presented access token
/// - `POST /refresh` - Exchange a refresh token for a new access token
/// - `PUT /user/change_password/:id` - Re-hash and store a new password
///
/// Login failures are deliberately indistinguishable: an unknown username
/// and a wrong password produce the same error body, and the unknown-user
/// path still performs a hashing round so response timing does not reveal
/// which case occurred.

use crate::{
    app::{AppState, AuthUser},
    error::{ApiError, ApiResult, TokenCode},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use paytrack_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

const INCORRECT_CREDENTIALS: &str = "Username and/or password incorrect.";
const USER_NOT_FOUND: &str = "User(s) not found.";
const LOGGED_OUT: &str = "Successfully logged out.";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Unique username
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub user_name: String,

    /// Plaintext password, hashed before persisting
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// First name
    #[validate(length(min = 1, max = 65, message = "First name must be 1-65 characters"))]
    pub fname: String,

    /// Last name
    #[validate(length(min = 1, max = 65, message = "Last name must be 1-65 characters"))]
    pub lname: String,

    /// Role tag
    #[validate(length(min = 1, max = 20, message = "Role must be 1-20 characters"))]
    pub role: String,
}

/// User payload returned by user-facing endpoints
///
/// Explicit allow-list: no password material, no search vector.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub user_name: String,
    pub fname: String,
    pub lname: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name,
            fname: user.fname,
            lname: user.lname,
            role: user.role,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub user_name: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Fresh access token (15 minutes)
    pub access_token: String,

    /// Refresh token (30 days)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New non-fresh access token
    pub access_token: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register a new staff user
///
/// # Endpoint
///
/// ```text
/// POST /register
/// {"user_name": "alice", "password": "secret", "fname": "A", "lname": "B", "role": "standard"}
/// ```
///
/// # Errors
///
/// - `400`: validation failed, or username already exists (the existing
///   user is left untouched)
/// - `500`: storage failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    if User::find_by_username(&state.db, &req.user_name).await?.is_some() {
        return Err(ApiError::Duplicate(format!(
            "Username '{}' already exists.",
            req.user_name
        )));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            user_name: req.user_name,
            fname: req.fname,
            lname: req.lname,
            password_hash,
            role: req.role,
        },
    )
    .await?;

    tracing::info!(user_id = user.user_id, "registered user");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Verify credentials and issue the token pair
///
/// # Endpoint
///
/// ```text
/// POST /login
/// {"user_name": "alice", "password": "secret"}
/// ```
///
/// # Errors
///
/// - `401`: incorrect credentials (unknown user and wrong password are not
///   distinguished)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_username(&state.db, &req.user_name).await?;

    let verified = match &user {
        Some(user) => password::verify_password(&req.password, &user.password_hash)?,
        None => {
            // Burn a hashing round so the missing-user path costs the same
            let _ = password::hash_password(&req.password);
            false
        }
    };

    let (Some(user), true) = (user, verified) else {
        return Err(ApiError::Unauthorized(INCORRECT_CREDENTIALS.to_string()));
    };

    let (access_token, refresh_token) = jwt::issue_login_tokens(user.user_id, state.jwt_secret())?;

    tracing::info!(user_id = user.user_id, "user logged in");

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
    }))
}

/// Revoke the presented access token
///
/// Requires a valid, non-revoked access token. Its `jti` goes on the
/// blocklist; every later use of that exact token is rejected with the
/// `token_revoked` code until it would have expired anyway.
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    state.blocklist.revoke(claims.jti, claims.exp);

    tracing::info!(user_id = claims.sub, "user logged out");

    Ok(Json(MessageResponse::new(LOGGED_OUT)))
}

/// Exchange a refresh token for a new access token
///
/// The minted token is marked not fresh: it cannot drive operations that
/// require freshly verified credentials.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    if state.blocklist.is_revoked(claims.jti) {
        return Err(ApiError::Token(TokenCode::TokenRevoked));
    }

    let access_token = jwt::issue_refreshed_access_token(claims.sub, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Re-hash and store a new password for a user
///
/// # Endpoint
///
/// ```text
/// PUT /user/change_password/:id
/// {"password": "new-secret"}
/// ```
///
/// Requires a *fresh* access token whose subject is the target user:
/// password changes always go through a recent credential check and are
/// self-service only.
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<i64>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<UserResponse>> {
    if !claims.fresh {
        return Err(ApiError::Token(TokenCode::TokenNotFresh));
    }

    if claims.sub != user_id {
        return Err(ApiError::Unauthorized(
            "Cannot change another user's password.".to_string(),
        ));
    }

    req.validate()?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    let password_hash = password::hash_password(&req.password)?;
    User::update_password(&state.db, user_id, &password_hash).await?;

    tracing::info!(user_id, "password changed");

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
    use paytrack_shared::auth::jwt::{Claims, TokenType};
    use sqlx::postgres::PgPoolOptions;

    fn test_state() -> AppState {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
        };

        // Lazy pool: both rejection paths below return before any query
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();

        AppState::new(pool, config)
    }

    #[tokio::test]
    async fn test_change_password_rejects_non_fresh_token() {
        let state = test_state();
        // Refreshed access tokens carry fresh = false
        let claims = Claims::new(1, TokenType::Access, false);

        let result = change_password(
            State(state),
            AuthUser(claims),
            Path(1),
            Json(ChangePasswordRequest {
                password: "new-secret".to_string(),
            }),
        )
        .await;

        assert!(matches!(
            result,
            Err(ApiError::Token(TokenCode::TokenNotFresh))
        ));
    }

    #[tokio::test]
    async fn test_change_password_rejects_other_users() {
        let state = test_state();
        let claims = Claims::new(1, TokenType::Access, true);

        let result = change_password(
            State(state),
            AuthUser(claims),
            Path(2),
            Json(ChangePasswordRequest {
                password: "new-secret".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_register_request_accepts_wire_format() {
        let body = r#"{"user_name":"alice","password":"secret","fname":"A","lname":"B","role":"standard"}"#;
        let req: RegisterRequest = serde_json::from_str(body).expect("should deserialize");

        assert_eq!(req.user_name, "alice");
        assert_eq!(req.role, "standard");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            user_name: String::new(),
            password: "secret".to_string(),
            fname: "A".to_string(),
            lname: "B".to_string(),
            role: "standard".to_string(),
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            user_name: "a".repeat(51),
            password: "secret".to_string(),
            fname: "A".to_string(),
            lname: "B".to_string(),
            role: "standard".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_user_response_excludes_password() {
        let user = User {
            user_id: 1,
            user_name: "alice".to_string(),
            fname: "A".to_string(),
            lname: "B".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            role: "standard".to_string(),
        };

        let response = UserResponse::from(user);
        let json = serde_json::to_value(&response).expect("should serialize");

        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("search_vector").is_none());
        assert_eq!(json["user_id"], 1);
        assert_eq!(json["user_name"], "alice");
    }

    #[test]
    fn test_login_validation_requires_both_fields() {
        let req = LoginRequest {
            user_name: "alice".to_string(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
