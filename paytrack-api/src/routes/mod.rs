/// API route handlers
///
/// Handlers are thin adapters: decode the request body, validate it,
/// invoke exactly one persistence or auth operation, encode the result.
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, logout, refresh, password change
/// - `users`: User CRUD and search
/// - `customers`: Customer CRUD and search
/// - `transactions`: Transaction CRUD and search

pub mod auth;
pub mod customers;
pub mod health;
pub mod transactions;
pub mod users;

use serde::{Deserialize, Serialize};

/// Plain confirmation payload, used by logout and delete endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
