pub mod memory;
pub mod postgres_ledger_store;
pub mod postgres_user_store;

pub use memory::{InMemoryLedgerStore, InMemoryUserStore};
pub use postgres_ledger_store::PostgresLedgerStore;
pub use postgres_user_store::PostgresUserStore;

use crate::ports::RepositoryError;
use crate::validation::{ValidationError, ValidationKind};

const CHECK_VIOLATION: &str = "23514";
const NOT_NULL_VIOLATION: &str = "23502";
const UNIQUE_VIOLATION: &str = "23505";

/// Turns Postgres constraint failures into domain errors; everything else
/// stays a database error.
pub(crate) fn map_db_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default();
        match db_err.code().as_deref() {
            Some(CHECK_VIOLATION) => {
                return RepositoryError::Constraint(check_violation(constraint));
            }
            Some(NOT_NULL_VIOLATION) => {
                return RepositoryError::Constraint(ValidationError::new(
                    ValidationKind::MissingField,
                    "body",
                    "All fields are required",
                ));
            }
            Some(UNIQUE_VIOLATION) => {
                let field = if constraint.contains("email") { "email" } else { "name" };
                return RepositoryError::Duplicate(field);
            }
            _ => {}
        }
    }

    RepositoryError::Database(err)
}

fn check_violation(constraint: &str) -> ValidationError {
    match constraint {
        "transactions_amount_check" => ValidationError::new(
            ValidationKind::InvalidAmount,
            "amount",
            "amount must be a positive number",
        ),
        "transactions_payer_check" => ValidationError::new(
            ValidationKind::InvalidPayer,
            "payer",
            "payer must be either \"Amina\" or \"Nanou\"",
        ),
        "transactions_description_check" => ValidationError::new(
            ValidationKind::InvalidDescription,
            "description",
            "description must be a non-empty string",
        ),
        "users_name_check" => ValidationError::new(
            ValidationKind::InvalidName,
            "name",
            "name must be either \"Amina\" or \"Nanou\"",
        ),
        _ => ValidationError::new(
            ValidationKind::InvalidAmount,
            "body",
            "Invalid payer name or amount",
        ),
    }
}
