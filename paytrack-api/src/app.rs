/// Application state and router builder
///
/// Shared state carries the database pool, configuration, and the token
/// blocklist. Authentication is performed by the [`AuthUser`] extractor:
/// handlers that require a token simply take it as an argument, so public
/// and protected methods can share a path.
///
/// # Example
///
/// ```no_run
/// use paytrack_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::error::{ApiError, TokenCode};
use crate::routes;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
    routing::{get, post, put},
    Router,
};
use paytrack_shared::auth::{blocklist::TokenBlocklist, jwt, jwt::Claims};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; `Arc` keeps the clone
/// cheap. The blocklist is the only mutable member and handles its own
/// locking.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Revoked-token set, shared across all in-flight requests
    pub blocklist: Arc<TokenBlocklist>,
}

impl AppState {
    /// Creates new application state with an empty blocklist
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            blocklist: Arc::new(TokenBlocklist::new()),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Validated access-token identity, extracted from the Authorization header
///
/// Extraction performs the full validation sequence: bearer parsing,
/// signature/expiry check, then blocklist lookup. Failures reject the
/// request with a 401 carrying the matching machine-readable code.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Token(TokenCode::TokenMissing))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Token(TokenCode::TokenInvalid))?;

        let claims = jwt::validate_access_token(token, state.jwt_secret())?;

        if state.blocklist.is_revoked(claims.jti) {
            return Err(ApiError::Token(TokenCode::TokenRevoked));
        }

        Ok(AuthUser(claims))
    }
}

/// Builds the complete Axum router
///
/// # Routes
///
/// ```text
/// /
/// ├── GET  /health
/// ├── POST /register, /login, /logout, /refresh
/// ├── /user/:id (GET public; PUT/DELETE authenticated)
/// │   └── PUT /user/change_password/:id (fresh token)
/// ├── GET /users, /users/search/:term
/// ├── /customer/new, /customer/:id, /customers, /customers/search/:term
/// └── /transaction/new, /transaction/:id, /transactions, /transactions/search/:term
/// ```
///
/// Middleware: request tracing (tower-http `TraceLayer`) and permissive
/// CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Authentication
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        // Users
        .route(
            "/user/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/user/change_password/:id", put(routes::auth::change_password))
        .route("/users", get(routes::users::list_users))
        .route("/users/search/:term", get(routes::users::search_users))
        // Customers
        .route("/customer/new", post(routes::customers::create_customer))
        .route(
            "/customer/:id",
            get(routes::customers::get_customer)
                .put(routes::customers::update_customer)
                .delete(routes::customers::delete_customer),
        )
        .route("/customers", get(routes::customers::list_customers))
        .route("/customers/search/:term", get(routes::customers::search_customers))
        // Transactions
        .route("/transaction/new", post(routes::transactions::create_transaction))
        .route(
            "/transaction/:id",
            get(routes::transactions::get_transaction)
                .put(routes::transactions::update_transaction)
                .delete(routes::transactions::delete_transaction),
        )
        .route("/transactions", get(routes::transactions::list_transactions))
        .route(
            "/transactions/search/:term",
            get(routes::transactions::search_transactions),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DatabaseConfig, JwtConfig};
    use axum::http::Request;
    use paytrack_shared::auth::jwt::TokenType;
    use sqlx::postgres::PgPoolOptions;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

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
                secret: SECRET.to_string(),
            },
        };

        // Lazy pool: no connection is made until a query runs, and these
        // tests never reach the database.
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();

        AppState::new(pool, config)
    }

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/users");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_valid_token_accepted() {
        let state = test_state();
        let claims = Claims::new(42, TokenType::Access, true);
        let token = jwt::create_token(&claims, SECRET).unwrap();
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let AuthUser(extracted) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();

        assert_eq!(extracted.sub, 42);
        assert_eq!(extracted.jti, claims.jti);
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let state = test_state();
        let mut parts = parts_with_header(None);

        let result = AuthUser::from_request_parts(&mut parts, &state).await;

        assert!(matches!(
            result,
            Err(ApiError::Token(TokenCode::TokenMissing))
        ));
    }

    #[tokio::test]
    async fn test_non_bearer_header_rejected() {
        let state = test_state();
        let mut parts = parts_with_header(Some("Basic dXNlcjpwYXNz"));

        let result = AuthUser::from_request_parts(&mut parts, &state).await;

        assert!(matches!(
            result,
            Err(ApiError::Token(TokenCode::TokenInvalid))
        ));
    }

    #[tokio::test]
    async fn test_revoked_token_rejected() {
        let state = test_state();
        let claims = Claims::new(1, TokenType::Access, true);
        let token = jwt::create_token(&claims, SECRET).unwrap();

        // Accepted before revocation
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
        assert!(AuthUser::from_request_parts(&mut parts, &state)
            .await
            .is_ok());

        // Logout revokes the jti; the same token must now be refused
        state.blocklist.revoke(claims.jti, claims.exp);

        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
        let result = AuthUser::from_request_parts(&mut parts, &state).await;

        assert!(matches!(
            result,
            Err(ApiError::Token(TokenCode::TokenRevoked))
        ));
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_on_access_path() {
        let state = test_state();
        let claims = Claims::new(1, TokenType::Refresh, false);
        let token = jwt::create_token(&claims, SECRET).unwrap();
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let result = AuthUser::from_request_parts(&mut parts, &state).await;

        assert!(matches!(
            result,
            Err(ApiError::Token(TokenCode::TokenInvalid))
        ));
    }
}
