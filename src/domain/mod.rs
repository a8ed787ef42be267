//! Framework-agnostic ledger types.

pub mod amount;
pub mod debt;
pub mod party;
pub mod transaction;
pub mod user;

pub use debt::DebtSummary;
pub use party::Party;
pub use transaction::{NewTransaction, Transaction, TransactionId, TransactionStatus};
pub use user::{NewUser, PublicUser, User, UserId};
