use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::domain::{DebtSummary, NewTransaction, Party, Transaction};
use crate::error::AppError;
use crate::ports::LedgerStore;
use crate::validation::{
    self, is_missing, parse_amount, parse_description, parse_payer, ValidationError,
};

/// Body of `POST /transactions`. Fields stay loosely typed so that every bad
/// input is reported as a validation error rather than a JSON rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateTransaction {
    #[schema(value_type = String, example = "Amina")]
    pub payer: Option<Value>,
    #[schema(value_type = f64, example = 30.0)]
    pub amount: Option<Value>,
    #[schema(value_type = String, example = "Groceries")]
    pub description: Option<Value>,
}

impl CreateTransaction {
    /// Missing fields are reported before any field is inspected.
    pub fn validate(&self) -> Result<NewTransaction, ValidationError> {
        let fields = [
            ("payer", self.payer.as_ref()),
            ("amount", self.amount.as_ref()),
            ("description", self.description.as_ref()),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| is_missing(*value))
            .map(|(field, _)| *field)
            .collect();

        if !missing.is_empty() {
            return Err(ValidationError::missing(&missing));
        }

        let null = Value::Null;
        let payer = parse_payer(self.payer.as_ref().unwrap_or(&null))?;
        let amount = parse_amount(self.amount.as_ref().unwrap_or(&null))?;
        let description = parse_description(self.description.as_ref().unwrap_or(&null))?;

        Ok(NewTransaction {
            payer,
            amount,
            description,
        })
    }
}

/// Validates ledger requests and drives the store. Handlers go through this
/// for every mutation.
#[derive(Clone)]
pub struct TransactionService {
    store: Arc<dyn LedgerStore>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn create_transaction(
        &self,
        request: &CreateTransaction,
        actor: Party,
    ) -> Result<Transaction, AppError> {
        let new_tx = request.validate()?;
        let created = self.store.insert(&new_tx).await?;

        tracing::info!(
            actor = %actor,
            transaction_id = created.id,
            payer = %created.payer,
            amount = %created.amount,
            "Transaction created"
        );

        Ok(created)
    }

    pub async fn pay_transaction(&self, raw_id: &str, actor: Party) -> Result<Transaction, AppError> {
        let id = validation::parse_transaction_id(raw_id)?;

        match self.store.mark_paid(id).await? {
            Some(paid) => {
                tracing::info!(actor = %actor, transaction_id = id, "Transaction marked as paid");
                Ok(paid)
            }
            None => Err(AppError::NotFound(
                "Transaction not found or already paid".to_string(),
            )),
        }
    }

    pub async fn delete_transaction(&self, raw_id: &str, actor: Party) -> Result<(), AppError> {
        let id = validation::parse_transaction_id(raw_id)?;

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(
                "Transaction with this ID does not exist".to_string(),
            ));
        }

        tracing::info!(actor = %actor, transaction_id = id, "Transaction deleted");
        Ok(())
    }

    pub async fn get_debt_summary(&self) -> Result<DebtSummary, AppError> {
        let totals = self.store.sum_unpaid_by_payer().await?;
        Ok(DebtSummary::from_unpaid_totals(&totals))
    }
}
