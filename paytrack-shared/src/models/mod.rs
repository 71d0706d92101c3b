/// Database models and persistence operations
///
/// One module per table, each exposing find/list/search/create/update/
/// delete methods against a `PgPool`:
///
/// - `user`: staff accounts (unique username, hashed password, role)
/// - `customer`: customer accounts
/// - `transaction`: payment transaction entries
/// - `search`: prefix tsquery construction shared by all three

pub mod customer;
pub mod search;
pub mod transaction;
pub mod user;

pub use customer::Customer;
pub use transaction::Transaction;
pub use user::User;
