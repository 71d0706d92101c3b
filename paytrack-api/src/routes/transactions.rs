/// Transaction CRUD and search endpoints
///
/// # Endpoints
///
/// - `POST /transaction/new` - Record a payment transaction
/// - `GET/PUT/DELETE /transaction/:id`
/// - `GET /transactions` - List all, newest entry date first
/// - `GET /transactions/search/:term` - Prefix search; 404 on no match
///
/// Monetary fields are integers in the smallest currency unit end to end;
/// an `amount` of 500 is five hundred cents, never `5.00`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use paytrack_shared::models::transaction::{Transaction, TransactionData};
use serde::{Deserialize, Serialize};
use validator::Validate;

const TRANSACTION_NOT_FOUND: &str = "Could not find the transaction(s).";
const TRANSACTION_DELETED: &str = "Transaction entry successfully deleted.";

/// Transaction create/update request
///
/// `date_entered` is not accepted: the database assigns it at creation.
#[derive(Debug, Deserialize, Validate)]
pub struct TransactionRequest {
    #[validate(length(min = 1, max = 50, message = "Receipt number must be 1-50 characters"))]
    pub receipt_num: String,

    pub account_id: i64,

    #[validate(length(min = 1, max = 130, message = "Customer name must be 1-130 characters"))]
    pub customer_name: String,

    #[validate(length(min = 1, max = 255, message = "Description must be 1-255 characters"))]
    pub description: String,

    /// Amount in the smallest currency unit
    pub amount: i64,

    #[validate(length(min = 1, max = 15, message = "Payment type must be 1-15 characters"))]
    pub payment_type: String,

    #[validate(length(min = 1, max = 15, message = "Utility must be 1-15 characters"))]
    pub utility: String,

    /// Service charge in the smallest currency unit
    pub service_charge: i64,

    /// Balance due in the smallest currency unit
    pub balance_due: i64,

    #[validate(length(min = 1, max = 65, message = "Processor must be 1-65 characters"))]
    pub processor: String,

    pub user_id: i64,
}

impl From<TransactionRequest> for TransactionData {
    fn from(req: TransactionRequest) -> Self {
        Self {
            receipt_num: req.receipt_num,
            account_id: req.account_id,
            customer_name: req.customer_name,
            description: req.description,
            amount: req.amount,
            payment_type: req.payment_type,
            utility: req.utility,
            service_charge: req.service_charge,
            balance_due: req.balance_due,
            processor: req.processor,
            user_id: req.user_id,
        }
    }
}

/// Transaction payload returned to clients
///
/// `date_entered` is dump-only; the search vector never appears.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction_id: i64,
    pub receipt_num: String,
    pub date_entered: NaiveDate,
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

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            transaction_id: tx.transaction_id,
            receipt_num: tx.receipt_num,
            date_entered: tx.date_entered,
            account_id: tx.account_id,
            customer_name: tx.customer_name,
            description: tx.description,
            amount: tx.amount,
            payment_type: tx.payment_type,
            utility: tx.utility,
            service_charge: tx.service_charge,
            balance_due: tx.balance_due,
            processor: tx.processor,
            user_id: tx.user_id,
        }
    }
}

/// Wrapped transaction list payload
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionResponse>,
}

/// Record a new payment transaction
///
/// Foreign keys must reference existing customer and user rows; a
/// violation surfaces as a 400 constraint error.
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(req): Json<TransactionRequest>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    req.validate()?;

    let tx = Transaction::create(&state.db, req.into()).await?;

    tracing::info!(transaction_id = tx.transaction_id, "created transaction");

    Ok((StatusCode::CREATED, Json(tx.into())))
}

/// Fetch one transaction by id
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
) -> ApiResult<Json<TransactionResponse>> {
    let tx = Transaction::find_by_id(&state.db, transaction_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TRANSACTION_NOT_FOUND.to_string()))?;

    Ok(Json(tx.into()))
}

/// Update a transaction by full field replacement
///
/// The original entry date is preserved.
pub async fn update_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
    Json(req): Json<TransactionRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    req.validate()?;

    let tx = Transaction::update(&state.db, transaction_id, req.into())
        .await?
        .ok_or_else(|| ApiError::NotFound(TRANSACTION_NOT_FOUND.to_string()))?;

    Ok(Json(tx.into()))
}

/// Delete a transaction entry
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Transaction::delete(&state.db, transaction_id).await?;
    if !deleted {
        return Err(ApiError::NotFound(TRANSACTION_NOT_FOUND.to_string()));
    }

    Ok(Json(MessageResponse::new(TRANSACTION_DELETED)))
}

/// List all transactions, newest entry date first
pub async fn list_transactions(
    State(state): State<AppState>,
) -> ApiResult<Json<TransactionsResponse>> {
    let transactions = Transaction::find_all(&state.db).await?;

    Ok(Json(TransactionsResponse {
        transactions: transactions.into_iter().map(Into::into).collect(),
    }))
}

/// Prefix search over transactions; 404 on no match
pub async fn search_transactions(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> ApiResult<Json<TransactionsResponse>> {
    let transactions = Transaction::text_search(&state.db, &term).await?;

    if transactions.is_empty() {
        return Err(ApiError::NotFound(TRANSACTION_NOT_FOUND.to_string()));
    }

    Ok(Json(TransactionsResponse {
        transactions: transactions.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> TransactionRequest {
        TransactionRequest {
            receipt_num: "R-1001".to_string(),
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
        }
    }

    #[test]
    fn test_request_validation() {
        assert!(sample_request().validate().is_ok());

        let mut req = sample_request();
        req.receipt_num = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_amount_is_integer_on_the_wire() {
        let body = r#"{"receipt_num":"R-1","account_id":1,"customer_name":"J","description":"d",
            "amount":500,"payment_type":"cash","utility":"water","service_charge":0,
            "balance_due":0,"processor":"p","user_id":1}"#;

        let req: TransactionRequest = serde_json::from_str(body).expect("should deserialize");
        assert_eq!(req.amount, 500);

        // A float amount is rejected outright
        let bad = body.replace("\"amount\":500", "\"amount\":5.00");
        assert!(serde_json::from_str::<TransactionRequest>(&bad).is_err());
    }

    #[test]
    fn test_response_roundtrips_amount_exactly() {
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

        let json = serde_json::to_string(&TransactionResponse::from(tx)).unwrap();
        assert!(json.contains("\"amount\":500"));
        assert!(json.contains("\"date_entered\":\"2024-03-01\""));
    }

    #[test]
    fn test_request_rejects_date_entered() {
        // date_entered is server-assigned; clients cannot set it
        let body = r#"{"receipt_num":"R-1","account_id":1,"customer_name":"J","description":"d",
            "amount":500,"payment_type":"cash","utility":"water","service_charge":0,
            "balance_due":0,"processor":"p","user_id":1,"date_entered":"2020-01-01"}"#;

        // Unknown fields are ignored by serde default; the struct simply
        // has no slot for it, so the value can never reach the database.
        let req: TransactionRequest = serde_json::from_str(body).expect("should deserialize");
        assert_eq!(req.amount, 500);
    }
}
