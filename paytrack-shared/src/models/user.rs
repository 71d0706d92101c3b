/// User model and database operations
///
/// Users are the staff accounts that authenticate against the API and
/// record transactions. Usernames are unique; passwords are stored as
/// Argon2id hashes only.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     user_id BIGSERIAL PRIMARY KEY,
///     user_name VARCHAR(50) NOT NULL UNIQUE,
///     fname VARCHAR(65) NOT NULL,
///     lname VARCHAR(65) NOT NULL,
///     password_hash VARCHAR(254) NOT NULL,
///     role VARCHAR(20) NOT NULL,
///     search_vector TSVECTOR GENERATED ALWAYS AS (...) STORED
/// );
/// ```
///
/// The generated `search_vector` covers username, names, and role; it is
/// maintained by the database and never selected into this struct.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::search;

/// A staff user account
///
/// `password_hash` stays inside the application; response payloads are
/// built from explicit DTOs in the API crate and never include it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id, assigned by the database
    pub user_id: i64,

    /// Unique username
    pub user_name: String,

    /// First name
    pub fname: String,

    /// Last name
    pub lname: String,

    /// Argon2id password hash (never plaintext)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role tag, e.g. "standard" or "admin"
    pub role: String,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub user_name: String,
    pub fname: String,
    pub lname: String,
    /// Already-hashed password (hashing happens in the auth component)
    pub password_hash: String,
    pub role: String,
}

/// Input for a profile update (full field replacement, password excluded)
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub user_name: String,
    pub fname: String,
    pub lname: String,
    pub role: String,
}

const USER_COLUMNS: &str = "user_id, user_name, fname, lname, password_hash, role";

impl User {
    /// Creates a new user
    ///
    /// Fails with a unique-constraint violation when the username is
    /// already taken; callers translate that into a duplicate error.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_name, fname, lname, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING user_id, user_name, fname, lname, password_hash, role
            "#,
        )
        .bind(data.user_name)
        .bind(data.fname)
        .bind(data.lname)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by id
    pub async fn find_by_id(pool: &PgPool, user_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by username
    pub async fn find_by_username(pool: &PgPool, user_name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_name = $1"
        ))
        .bind(user_name)
        .fetch_optional(pool)
        .await
    }

    /// Lists all users, ordered by id ascending
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY user_id"
        ))
        .fetch_all(pool)
        .await
    }

    /// Prefix search over the user search vector
    ///
    /// Matches username, first/last name, and role. An empty or fully
    /// sanitized-away term yields an empty list without touching the
    /// database.
    pub async fn text_search(pool: &PgPool, term: &str) -> Result<Vec<Self>, sqlx::Error> {
        let Some(query) = search::prefix_query(term) else {
            return Ok(Vec::new());
        };

        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE search_vector @@ to_tsquery('english', $1) \
             ORDER BY user_id"
        ))
        .bind(query)
        .fetch_all(pool)
        .await
    }

    /// Updates a user's profile by full field replacement
    ///
    /// Returns `None` when the user does not exist. The password is not
    /// touched here; see [`User::update_password`].
    pub async fn update(
        pool: &PgPool,
        user_id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET user_name = $2, fname = $3, lname = $4, role = $5
            WHERE user_id = $1
            RETURNING user_id, user_name, fname, lname, password_hash, role
            "#,
        )
        .bind(user_id)
        .bind(data.user_name)
        .bind(data.fname)
        .bind(data.lname)
        .bind(data.role)
        .fetch_optional(pool)
        .await
    }

    /// Replaces a user's password hash
    ///
    /// Returns false when the user does not exist.
    pub async fn update_password(
        pool: &PgPool,
        user_id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by id
    ///
    /// Deletion does not cascade; rows in `transactions` referencing the
    /// user make this fail with a foreign-key violation.
    pub async fn delete(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            user_id: 1,
            user_name: "alice".to_string(),
            fname: "A".to_string(),
            lname: "B".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: "standard".to_string(),
        };

        let json = serde_json::to_value(&user).expect("serialization should succeed");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("search_vector").is_none());
        assert_eq!(json["user_name"], "alice");
    }
}
