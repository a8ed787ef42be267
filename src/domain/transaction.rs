//! Transaction domain entity.
//! Framework-agnostic representation of one shared expense.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

use super::amount;
use super::party::Party;

/// Store-assigned identifier, always positive.
pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Unpaid,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transaction status: {0}")]
pub struct UnknownStatus(pub String);

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Unpaid => "unpaid",
            TransactionStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(TransactionStatus::Unpaid),
            "paid" => Ok(TransactionStatus::Paid),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Domain entity representing a recorded expense.
///
/// `status == Paid` exactly when `paid_at` is set; both are written together
/// by the store's conditional pay update and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub payer: Party,
    #[serde(serialize_with = "amount::serialize_as_number")]
    #[schema(value_type = f64, example = 42.5)]
    pub amount: BigDecimal,
    pub description: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_paid(&self) -> bool {
        self.status == TransactionStatus::Paid
    }
}

/// A validated request to record an expense, before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub payer: Party,
    pub amount: BigDecimal,
    pub description: String,
}
