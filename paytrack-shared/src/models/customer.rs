/// Customer model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE customers (
///     account_id BIGSERIAL PRIMARY KEY,
///     fname VARCHAR(65) NOT NULL,
///     lname VARCHAR(65) NOT NULL,
///     address VARCHAR(140) NOT NULL,
///     email VARCHAR(254) NOT NULL,
///     tel_num VARCHAR(15) NOT NULL,
///     mobile_num VARCHAR(15) NOT NULL,
///     service_type VARCHAR(22) NOT NULL,
///     comments VARCHAR(255) NOT NULL,
///     search_vector TSVECTOR GENERATED ALWAYS AS (...) STORED
/// );
/// ```
///
/// The generated `search_vector` covers name, address, email, and service
/// type.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::search;

/// A customer account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    /// Unique account id, assigned by the database
    pub account_id: i64,

    /// First name
    pub fname: String,

    /// Last name
    pub lname: String,

    /// Street address
    pub address: String,

    /// Contact email
    pub email: String,

    /// Landline number
    pub tel_num: String,

    /// Mobile number
    pub mobile_num: String,

    /// Service-type tag, e.g. "water", "electricity"
    pub service_type: String,

    /// Free-text comments
    pub comments: String,
}

/// Customer field set for create and full-replacement update
#[derive(Debug, Clone)]
pub struct CustomerData {
    pub fname: String,
    pub lname: String,
    pub address: String,
    pub email: String,
    pub tel_num: String,
    pub mobile_num: String,
    pub service_type: String,
    pub comments: String,
}

const CUSTOMER_COLUMNS: &str =
    "account_id, fname, lname, address, email, tel_num, mobile_num, service_type, comments";

impl Customer {
    /// Creates a new customer account
    pub async fn create(pool: &PgPool, data: CustomerData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers
                (fname, lname, address, email, tel_num, mobile_num, service_type, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING account_id, fname, lname, address, email, tel_num, mobile_num,
                      service_type, comments
            "#,
        )
        .bind(data.fname)
        .bind(data.lname)
        .bind(data.address)
        .bind(data.email)
        .bind(data.tel_num)
        .bind(data.mobile_num)
        .bind(data.service_type)
        .bind(data.comments)
        .fetch_one(pool)
        .await
    }

    /// Finds a customer by account id
    pub async fn find_by_id(pool: &PgPool, account_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE account_id = $1"
        ))
        .bind(account_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists all customers, ordered by account id
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY account_id"
        ))
        .fetch_all(pool)
        .await
    }

    /// Prefix search over the customer search vector
    ///
    /// Matches name, address, email, and service type.
    pub async fn text_search(pool: &PgPool, term: &str) -> Result<Vec<Self>, sqlx::Error> {
        let Some(query) = search::prefix_query(term) else {
            return Ok(Vec::new());
        };

        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE search_vector @@ to_tsquery('english', $1) \
             ORDER BY account_id"
        ))
        .bind(query)
        .fetch_all(pool)
        .await
    }

    /// Updates a customer by full field replacement
    ///
    /// Returns `None` when the account does not exist.
    pub async fn update(
        pool: &PgPool,
        account_id: i64,
        data: CustomerData,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET fname = $2, lname = $3, address = $4, email = $5,
                tel_num = $6, mobile_num = $7, service_type = $8, comments = $9
            WHERE account_id = $1
            RETURNING account_id, fname, lname, address, email, tel_num, mobile_num,
                      service_type, comments
            "#,
        )
        .bind(account_id)
        .bind(data.fname)
        .bind(data.lname)
        .bind(data.address)
        .bind(data.email)
        .bind(data.tel_num)
        .bind(data.mobile_num)
        .bind(data.service_type)
        .bind(data.comments)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a customer by account id
    ///
    /// No cascading; transactions referencing the account make this fail
    /// with a foreign-key violation.
    pub async fn delete(pool: &PgPool, account_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE account_id = $1")
            .bind(account_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
