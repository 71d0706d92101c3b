/// Authentication utilities
///
/// This module provides the building blocks for the authentication and
/// session component:
///
/// - `jwt`: Token creation and validation (HS256)
/// - `password`: Argon2id password hashing and verification
/// - `blocklist`: Revoked-token set consulted on every authenticated request

pub mod blocklist;
pub mod jwt;
pub mod password;
