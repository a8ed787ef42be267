//! Storage seams. Services depend on these traits; adapters implement them.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{NewTransaction, NewUser, Party, Transaction, TransactionId, User, UserId};
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store refused the row (check or unique constraint).
    #[error("constraint violated: {0}")]
    Constraint(ValidationError),

    #[error("duplicate value for {0}")]
    Duplicate(&'static str),

    /// A stored row could not be mapped back onto the domain.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Exclusive owner of persisted transaction state.
///
/// Every method is a single atomic operation against the backing store.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Records an unpaid transaction and returns it with its assigned id.
    async fn insert(&self, tx: &NewTransaction) -> RepositoryResult<Transaction>;

    /// All transactions, newest first.
    async fn list_all(&self) -> RepositoryResult<Vec<Transaction>>;

    /// Marks `id` paid only if it is currently unpaid.
    ///
    /// Returns `None` when the id is unknown or already paid.
    async fn mark_paid(&self, id: TransactionId) -> RepositoryResult<Option<Transaction>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: TransactionId) -> RepositoryResult<bool>;

    /// Total unpaid amount per payer. Parties without unpaid rows are absent.
    async fn sum_unpaid_by_payer(&self) -> RepositoryResult<HashMap<Party, BigDecimal>>;

    async fn health_check(&self) -> RepositoryResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Duplicate` when the name or email is taken.
    async fn create(&self, user: &NewUser) -> RepositoryResult<User>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;

    async fn find_by_name(&self, name: Party) -> RepositoryResult<Option<User>>;

    /// Party names that already have an account.
    async fn taken_names(&self) -> RepositoryResult<Vec<Party>>;
}
