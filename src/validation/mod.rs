use bigdecimal::BigDecimal;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::domain::amount::{fits_column, is_positive, round_to_cents};
use crate::domain::{Party, TransactionId};

pub const EMAIL_MAX_LEN: usize = 255;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const AMOUNT_INPUT_MAX_LEN: usize = 64;
/// Accepted decimal scale range for raw amounts. Rounding and comparison cost
/// grows with the exponent, so anything outside is refused before arithmetic.
pub const AMOUNT_SCALE_RANGE: std::ops::RangeInclusive<i64> = -8..=20;

/// Which rule an input broke. Each kind maps to a short title in API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    MissingField,
    InvalidPayer,
    InvalidAmount,
    InvalidDescription,
    InvalidId,
    InvalidName,
    InvalidEmail,
    InvalidPassword,
}

impl ValidationKind {
    pub fn title(&self) -> &'static str {
        match self {
            ValidationKind::MissingField => "Missing required fields",
            ValidationKind::InvalidPayer => "Invalid payer",
            ValidationKind::InvalidAmount => "Invalid amount",
            ValidationKind::InvalidDescription => "Invalid description",
            ValidationKind::InvalidId => "Invalid ID",
            ValidationKind::InvalidName => "Invalid name",
            ValidationKind::InvalidEmail => "Invalid email",
            ValidationKind::InvalidPassword => "Invalid password",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            field,
            message: message.into(),
        }
    }

    pub fn missing(fields: &[&'static str]) -> Self {
        Self::new(
            ValidationKind::MissingField,
            fields.first().copied().unwrap_or("body"),
            match fields {
                [only] => format!("{} is required", only),
                _ => format!("{} are required", join_fields(fields)),
            },
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T = ()> = Result<T, ValidationError>;

fn join_fields(fields: &[&'static str]) -> String {
    match fields {
        [] => "all fields".to_string(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// JSON null counts as absent.
pub fn is_missing(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

pub fn validate_max_len(
    kind: ValidationKind,
    field: &'static str,
    value: &str,
    max_len: usize,
) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            kind,
            field,
            format!("{} must be at most {} characters", field, max_len),
        ));
    }

    Ok(())
}

fn party_names() -> String {
    Party::ALL
        .iter()
        .map(|party| format!("\"{}\"", party))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Resolves a party name, reporting failures under `field` with `kind`.
pub fn parse_party(kind: ValidationKind, field: &'static str, value: &Value) -> ValidationResult<Party> {
    value
        .as_str()
        .and_then(|name| name.parse::<Party>().ok())
        .ok_or_else(|| {
            ValidationError::new(
                kind,
                field,
                format!("{} must be either {}", field, party_names()),
            )
        })
}

pub fn parse_payer(value: &Value) -> ValidationResult<Party> {
    parse_party(ValidationKind::InvalidPayer, "payer", value)
}

/// Accepts a JSON number or a numeric string; the result is rounded to cents.
pub fn parse_amount(value: &Value) -> ValidationResult<BigDecimal> {
    let invalid = || {
        ValidationError::new(
            ValidationKind::InvalidAmount,
            "amount",
            "amount must be a positive number",
        )
    };

    let raw = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() || text.len() > AMOUNT_INPUT_MAX_LEN {
                return Err(invalid());
            }
            text.to_string()
        }
        _ => return Err(invalid()),
    };

    let amount = BigDecimal::from_str(&raw).map_err(|_| invalid())?;
    let (_, scale) = amount.as_bigint_and_exponent();
    if !AMOUNT_SCALE_RANGE.contains(&scale) {
        return Err(invalid());
    }
    let amount = round_to_cents(&amount);

    if !is_positive(&amount) {
        return Err(invalid());
    }

    if !fits_column(&amount) {
        return Err(ValidationError::new(
            ValidationKind::InvalidAmount,
            "amount",
            "amount must be less than 100000000",
        ));
    }

    Ok(amount)
}

/// Returns the description trimmed of surrounding whitespace.
pub fn parse_description(value: &Value) -> ValidationResult<String> {
    match value.as_str().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ValidationError::new(
            ValidationKind::InvalidDescription,
            "description",
            "description must be a non-empty string",
        )),
    }
}

/// Ids come from the URL path and must be plain positive integers.
pub fn parse_transaction_id(raw: &str) -> ValidationResult<TransactionId> {
    let invalid = || {
        ValidationError::new(
            ValidationKind::InvalidId,
            "id",
            "Transaction ID must be a positive integer",
        )
    };

    if raw.is_empty() || !raw.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(invalid());
    }

    match raw.parse::<TransactionId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid()),
    }
}

pub fn validate_email(email: &str) -> ValidationResult {
    validate_max_len(ValidationKind::InvalidEmail, "email", email, EMAIL_MAX_LEN)?;

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::new(
            ValidationKind::InvalidEmail,
            "email",
            "email must be a valid address",
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::new(
            ValidationKind::InvalidPassword,
            "password",
            format!("password must contain at least {} characters", PASSWORD_MIN_LEN),
        ));
    }

    Ok(())
}
