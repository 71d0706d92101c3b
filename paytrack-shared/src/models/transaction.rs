/// Transaction model and database operations
///
/// Each transaction records a payment taken by a staff user for a customer
/// account. Monetary fields are integers in the smallest currency unit;
/// floating point never enters the picture.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE transactions (
///     transaction_id BIGSERIAL PRIMARY KEY,
///     receipt_num VARCHAR(50) NOT NULL,
///     date_entered DATE NOT NULL DEFAULT CURRENT_DATE,
///     account_id BIGINT NOT NULL REFERENCES customers (account_id),
///     customer_name VARCHAR(130) NOT NULL,
///     description VARCHAR(255) NOT NULL,
///     amount BIGINT NOT NULL,
///     payment_type VARCHAR(15) NOT NULL,
///     utility VARCHAR(15) NOT NULL,
///     service_charge BIGINT NOT NULL,
///     balance_due BIGINT NOT NULL,
///     processor VARCHAR(65) NOT NULL,
///     user_id BIGINT NOT NULL REFERENCES users (user_id),
///     search_vector TSVECTOR GENERATED ALWAYS AS (...) STORED
/// );
/// ```
///
/// `customer_name` is a denormalized copy taken at entry time, not derived
/// live from the customer row. The generated `search_vector` covers
/// receipt number, customer name, description, utility, and processor.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::search;

/// A payment transaction entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    /// Unique transaction id, assigned by the database
    pub transaction_id: i64,

    /// Receipt number from the paper trail
    pub receipt_num: String,

    /// Entry date, defaulted by the database to the creation date
    pub date_entered: NaiveDate,

    /// Customer account the payment applies to
    pub account_id: i64,

    /// Customer name copied at entry time
    pub customer_name: String,

    /// Description of the payment
    pub description: String,

    /// Amount in the smallest currency unit
    pub amount: i64,

    /// Payment type, e.g. "cash", "card"
    pub payment_type: String,

    /// Utility tag, e.g. "water"
    pub utility: String,

    /// Service charge in the smallest currency unit
    pub service_charge: i64,

    /// Remaining balance in the smallest currency unit
    pub balance_due: i64,

    /// Name of the payment processor
    pub processor: String,

    /// Staff user who recorded the entry
    pub user_id: i64,
}

/// Transaction field set for create and full-replacement update
///
/// `date_entered` is absent: the database assigns it on insert and it is
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct TransactionData {
    pub receipt_num: String,
    pub account_id: i64,
    pub customer_name: String,
    pub description: String,
    pub amount: i64,
    pub payment_type: String,
    pub utility: String,
    pub service_charge: i64,
    pub balance_due: i64,
    pub processor: String,
    pub user_id: i64,
}

const TRANSACTION_COLUMNS: &str = "transaction_id, receipt_num, date_entered, account_id, \
     customer_name, description, amount, payment_type, utility, service_charge, \
     balance_due, processor, user_id";

impl Transaction {
    /// Creates a new transaction entry
    ///
    /// The foreign keys must reference existing customer and user rows;
    /// violations surface as database errors.
    pub async fn create(pool: &PgPool, data: TransactionData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (receipt_num, account_id, customer_name, description, amount,
                 payment_type, utility, service_charge, balance_due, processor, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING transaction_id, receipt_num, date_entered, account_id, customer_name,
                      description, amount, payment_type, utility, service_charge,
                      balance_due, processor, user_id
            "#,
        )
        .bind(data.receipt_num)
        .bind(data.account_id)
        .bind(data.customer_name)
        .bind(data.description)
        .bind(data.amount)
        .bind(data.payment_type)
        .bind(data.utility)
        .bind(data.service_charge)
        .bind(data.balance_due)
        .bind(data.processor)
        .bind(data.user_id)
        .fetch_one(pool)
        .await
    }

    /// Finds a transaction by id
    pub async fn find_by_id(
        pool: &PgPool,
        transaction_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists all transactions, most recent entry date first
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY date_entered DESC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Prefix search over the transaction search vector
    ///
    /// Matches receipt number, customer name, description, utility, and
    /// processor; ordered like [`Transaction::find_all`].
    pub async fn text_search(pool: &PgPool, term: &str) -> Result<Vec<Self>, sqlx::Error> {
        let Some(query) = search::prefix_query(term) else {
            return Ok(Vec::new());
        };

        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE search_vector @@ to_tsquery('english', $1) \
             ORDER BY date_entered DESC"
        ))
        .bind(query)
        .fetch_all(pool)
        .await
    }

    /// Updates a transaction by full field replacement
    ///
    /// `date_entered` keeps its original value. Returns `None` when the
    /// transaction does not exist.
    pub async fn update(
        pool: &PgPool,
        transaction_id: i64,
        data: TransactionData,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET receipt_num = $2, account_id = $3, customer_name = $4, description = $5,
                amount = $6, payment_type = $7, utility = $8, service_charge = $9,
                balance_due = $10, processor = $11, user_id = $12
            WHERE transaction_id = $1
            RETURNING transaction_id, receipt_num, date_entered, account_id, customer_name,
                      description, amount, payment_type, utility, service_charge,
                      balance_due, processor, user_id
            "#,
        )
        .bind(transaction_id)
        .bind(data.receipt_num)
        .bind(data.account_id)
        .bind(data.customer_name)
        .bind(data.description)
        .bind(data.amount)
        .bind(data.payment_type)
        .bind(data.utility)
        .bind(data.service_charge)
        .bind(data.balance_due)
        .bind(data.processor)
        .bind(data.user_id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a transaction by id
    pub async fn delete(pool: &PgPool, transaction_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE transaction_id = $1")
            .bind(transaction_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_roundtrips_as_integer() {
        let tx = Transaction {
            transaction_id: 1,
            receipt_num: "R-1001".to_string(),
            date_entered: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            account_id: 2,
            customer_name: "Jane Doe".to_string(),
            description: "Water bill".to_string(),
            amount: 500,
            payment_type: "cash".to_string(),
            utility: "water".to_string(),
            service_charge: 25,
            balance_due: 0,
            processor: "Western Union".to_string(),
            user_id: 3,
        };

        let json = serde_json::to_string(&tx).expect("serialization should succeed");
        // Integer cents, never a float rendering
        assert!(json.contains("\"amount\":500"));
        assert!(!json.contains("5.00"));

        let back: Transaction = serde_json::from_str(&json).expect("deserialization");
        assert_eq!(back.amount, 500);
        assert_eq!(back.service_charge, 25);
    }
}
