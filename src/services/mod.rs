pub mod auth;
pub mod transaction_service;

pub use auth::AuthService;
pub use transaction_service::{CreateTransaction, TransactionService};
