/// Customer CRUD and search endpoints
///
/// # Endpoints
///
/// - `POST /customer/new` - Create a customer account
/// - `GET/PUT/DELETE /customer/:id`
/// - `GET /customers` - List all customers
/// - `GET /customers/search/:term` - Prefix search; 404 on no match

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
use paytrack_shared::models::customer::{Customer, CustomerData};
use serde::{Deserialize, Serialize};
use validator::Validate;

const CUSTOMER_NOT_FOUND: &str = "Could not find customer(s).";
const CUSTOMER_DELETED: &str = "Customer account deleted.";

/// Customer create/update request (full field set)
#[derive(Debug, Deserialize, Validate)]
pub struct CustomerRequest {
    #[validate(length(min = 1, max = 65, message = "First name must be 1-65 characters"))]
    pub fname: String,

    #[validate(length(min = 1, max = 65, message = "Last name must be 1-65 characters"))]
    pub lname: String,

    #[validate(length(min = 1, max = 140, message = "Address must be 1-140 characters"))]
    pub address: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 15, message = "Telephone must be 1-15 characters"))]
    pub tel_num: String,

    #[validate(length(min = 1, max = 15, message = "Mobile must be 1-15 characters"))]
    pub mobile_num: String,

    #[validate(length(min = 1, max = 22, message = "Service type must be 1-22 characters"))]
    pub service_type: String,

    #[validate(length(max = 255, message = "Comments must be at most 255 characters"))]
    pub comments: String,
}

impl From<CustomerRequest> for CustomerData {
    fn from(req: CustomerRequest) -> Self {
        Self {
            fname: req.fname,
            lname: req.lname,
            address: req.address,
            email: req.email,
            tel_num: req.tel_num,
            mobile_num: req.mobile_num,
            service_type: req.service_type,
            comments: req.comments,
        }
    }
}

/// Customer payload returned to clients (search vector excluded)
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub account_id: i64,
    pub fname: String,
    pub lname: String,
    pub address: String,
    pub email: String,
    pub tel_num: String,
    pub mobile_num: String,
    pub service_type: String,
    pub comments: String,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            account_id: customer.account_id,
            fname: customer.fname,
            lname: customer.lname,
            address: customer.address,
            email: customer.email,
            tel_num: customer.tel_num,
            mobile_num: customer.mobile_num,
            service_type: customer.service_type,
            comments: customer.comments,
        }
    }
}

/// Wrapped customer list payload
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomersResponse {
    pub customers: Vec<CustomerResponse>,
}

/// Create a customer account
pub async fn create_customer(
    State(state): State<AppState>,
    Json(req): Json<CustomerRequest>,
) -> ApiResult<(StatusCode, Json<CustomerResponse>)> {
    req.validate()?;

    let customer = Customer::create(&state.db, req.into()).await?;

    tracing::info!(account_id = customer.account_id, "created customer");

    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// Fetch one customer by account id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> ApiResult<Json<CustomerResponse>> {
    let customer = Customer::find_by_id(&state.db, account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

    Ok(Json(customer.into()))
}

/// Update a customer by full field replacement
pub async fn update_customer(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
    Json(req): Json<CustomerRequest>,
) -> ApiResult<Json<CustomerResponse>> {
    req.validate()?;

    let customer = Customer::update(&state.db, account_id, req.into())
        .await?
        .ok_or_else(|| ApiError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

    Ok(Json(customer.into()))
}

/// Delete a customer account
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Customer::delete(&state.db, account_id).await?;
    if !deleted {
        return Err(ApiError::NotFound(CUSTOMER_NOT_FOUND.to_string()));
    }

    Ok(Json(MessageResponse::new(CUSTOMER_DELETED)))
}

/// List all customers
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Json<CustomersResponse>> {
    let customers = Customer::find_all(&state.db).await?;

    Ok(Json(CustomersResponse {
        customers: customers.into_iter().map(Into::into).collect(),
    }))
}

/// Prefix search over customers; 404 on no match
pub async fn search_customers(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> ApiResult<Json<CustomersResponse>> {
    let customers = Customer::text_search(&state.db, &term).await?;

    if customers.is_empty() {
        return Err(ApiError::NotFound(CUSTOMER_NOT_FOUND.to_string()));
    }

    Ok(Json(CustomersResponse {
        customers: customers.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CustomerRequest {
        CustomerRequest {
            fname: "Jane".to_string(),
            lname: "Doe".to_string(),
            address: "12 Main St".to_string(),
            email: "jane@example.com".to_string(),
            tel_num: "5551234".to_string(),
            mobile_num: "5555678".to_string(),
            service_type: "water".to_string(),
            comments: String::new(),
        }
    }

    #[test]
    fn test_request_validation() {
        assert!(sample_request().validate().is_ok());

        let mut req = sample_request();
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());

        let mut req = sample_request();
        req.tel_num = "1".repeat(16);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_response_excludes_search_vector() {
        let customer = Customer {
            account_id: 5,
            fname: "Jane".to_string(),
            lname: "Doe".to_string(),
            address: "12 Main St".to_string(),
            email: "jane@example.com".to_string(),
            tel_num: "5551234".to_string(),
            mobile_num: "5555678".to_string(),
            service_type: "water".to_string(),
            comments: String::new(),
        };

        let json = serde_json::to_value(CustomerResponse::from(customer)).unwrap();
        assert!(json.get("search_vector").is_none());
        assert_eq!(json["account_id"], 5);
    }
}
