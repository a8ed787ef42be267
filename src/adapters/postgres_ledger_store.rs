//! Postgres implementation of LedgerStore.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;

use super::map_db_error;
use crate::domain::{NewTransaction, Party, Transaction, TransactionId, TransactionStatus};
use crate::ports::{LedgerStore, RepositoryError, RepositoryResult};

const TRANSACTION_COLUMNS: &str = "id, payer, amount, description, status, created_at, paid_at";

/// Postgres-backed ledger. Constraint checks live in the schema.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn insert(&self, tx: &NewTransaction) -> RepositoryResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            INSERT INTO transactions (payer, amount, description)
            VALUES ($1, $2, $3)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(tx.payer.as_str())
        .bind(&tx.amount)
        .bind(&tx.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.into_domain()
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    async fn mark_paid(&self, id: TransactionId) -> RepositoryResult<Option<Transaction>> {
        // Conditional update: concurrent pay requests cannot both match the row.
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            UPDATE transactions
            SET status = 'paid', paid_at = NOW()
            WHERE id = $1 AND status = 'unpaid'
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(TransactionRow::into_domain).transpose()
    }

    async fn delete(&self, id: TransactionId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn sum_unpaid_by_payer(&self) -> RepositoryResult<HashMap<Party, BigDecimal>> {
        let rows: Vec<(String, BigDecimal)> = sqlx::query_as(
            r#"
            SELECT payer, SUM(amount) AS total
            FROM transactions
            WHERE status = 'unpaid'
            GROUP BY payer
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter()
            .map(|(payer, total)| {
                payer
                    .parse::<Party>()
                    .map(|payer| (payer, total))
                    .map_err(|e| RepositoryError::Corrupt(e.to_string()))
            })
            .collect()
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    payer: String,
    amount: BigDecimal,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl TransactionRow {
    fn into_domain(self) -> RepositoryResult<Transaction> {
        let payer = self
            .payer
            .parse::<Party>()
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
        let status = self
            .status
            .parse::<TransactionStatus>()
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;

        Ok(Transaction {
            id: self.id,
            payer,
            amount: self.amount,
            description: self.description,
            status,
            created_at: self.created_at,
            paid_at: self.paid_at,
        })
    }
}
