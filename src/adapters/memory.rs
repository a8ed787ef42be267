//! In-process stores for tests and local experiments.
//!
//! Each operation runs under a single lock acquisition, which gives the same
//! atomicity the Postgres adapters get from single statements.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::domain::amount::{fits_column, is_positive};
use crate::domain::{
    NewTransaction, NewUser, Party, Transaction, TransactionId, TransactionStatus, User, UserId,
};
use crate::ports::{LedgerStore, RepositoryError, RepositoryResult, UserStore};
use crate::validation::{ValidationError, ValidationKind};

#[derive(Default)]
struct LedgerState {
    last_id: TransactionId,
    rows: BTreeMap<TransactionId, Transaction>,
}

#[derive(Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Mirrors the CHECK constraints of the `transactions` table.
fn check_row(tx: &NewTransaction) -> RepositoryResult<()> {
    if !is_positive(&tx.amount) || !fits_column(&tx.amount) {
        return Err(RepositoryError::Constraint(ValidationError::new(
            ValidationKind::InvalidAmount,
            "amount",
            "amount must be a positive number",
        )));
    }

    if tx.description.trim().is_empty() {
        return Err(RepositoryError::Constraint(ValidationError::new(
            ValidationKind::InvalidDescription,
            "description",
            "description must be a non-empty string",
        )));
    }

    Ok(())
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert(&self, tx: &NewTransaction) -> RepositoryResult<Transaction> {
        check_row(tx)?;

        let mut state = self.state.write().await;
        state.last_id += 1;
        let record = Transaction {
            id: state.last_id,
            payer: tx.payer,
            amount: tx.amount.clone(),
            description: tx.description.clone(),
            status: TransactionStatus::Unpaid,
            created_at: Utc::now(),
            paid_at: None,
        };
        state.rows.insert(record.id, record.clone());

        Ok(record)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Transaction>> {
        let state = self.state.read().await;
        let mut rows: Vec<Transaction> = state.rows.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn mark_paid(&self, id: TransactionId) -> RepositoryResult<Option<Transaction>> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&id) {
            Some(record) if record.status == TransactionStatus::Unpaid => {
                record.status = TransactionStatus::Paid;
                record.paid_at = Some(Utc::now());
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: TransactionId) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.rows.remove(&id).is_some())
    }

    async fn sum_unpaid_by_payer(&self) -> RepositoryResult<HashMap<Party, BigDecimal>> {
        let state = self.state.read().await;
        let mut totals: HashMap<Party, BigDecimal> = HashMap::new();
        for record in state
            .rows
            .values()
            .filter(|record| record.status == TransactionStatus::Unpaid)
        {
            let total = totals.entry(record.payer).or_insert_with(|| BigDecimal::from(0));
            *total = &*total + &record.amount;
        }
        Ok(totals)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct UserState {
    last_id: UserId,
    users: Vec<User>,
}

#[derive(Default)]
pub struct InMemoryUserStore {
    state: RwLock<UserState>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: &NewUser) -> RepositoryResult<User> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|existing| existing.name == user.name) {
            return Err(RepositoryError::Duplicate("name"));
        }
        if state.users.iter().any(|existing| existing.email == user.email) {
            return Err(RepositoryError::Duplicate("email"));
        }

        state.last_id += 1;
        let record = User {
            id: state.last_id,
            name: user.name,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: Utc::now(),
        };
        state.users.push(record.clone());

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_name(&self, name: Party) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|user| user.name == name).cloned())
    }

    async fn taken_names(&self) -> RepositoryResult<Vec<Party>> {
        let state = self.state.read().await;
        let mut names: Vec<Party> = state.users.iter().map(|user| user.name).collect();
        names.sort();
        Ok(names)
    }
}
