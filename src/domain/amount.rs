//! Currency amounts are `BigDecimal` values stored as `NUMERIC(10,2)`.

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{ser::Error as _, Serializer};

/// Fractional digits kept for every stored amount.
pub const CENTS_SCALE: i64 = 2;

/// Exclusive upper bound of a `NUMERIC(10,2)` column.
pub fn amount_limit() -> BigDecimal {
    BigDecimal::from(100_000_000)
}

pub fn fits_column(amount: &BigDecimal) -> bool {
    amount < &amount_limit()
}

pub fn round_to_cents(amount: &BigDecimal) -> BigDecimal {
    amount.round(CENTS_SCALE)
}

pub fn is_positive(amount: &BigDecimal) -> bool {
    amount > &BigDecimal::from(0)
}

/// Writes an amount as a JSON number rather than bigdecimal's default string.
pub fn serialize_as_number<S>(amount: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let value = amount
        .to_f64()
        .ok_or_else(|| S::Error::custom("amount does not fit in a JSON number"))?;
    serializer.serialize_f64(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn rounds_to_two_digits() {
        let amount = BigDecimal::from_str("12.3449").unwrap();
        assert_eq!(round_to_cents(&amount), BigDecimal::from_str("12.34").unwrap());
        assert!(!is_positive(&round_to_cents(&BigDecimal::from_str("0.001").unwrap())));
    }

    #[test]
    fn column_limit_is_exclusive() {
        assert!(fits_column(&BigDecimal::from_str("99999999.99").unwrap()));
        assert!(!fits_column(&BigDecimal::from(100_000_000)));
    }

    #[test]
    fn serializes_amount_as_number() {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "serialize_as_number")]
            amount: BigDecimal,
        }

        let json = serde_json::to_value(Wrapper {
            amount: BigDecimal::from_str("42.50").unwrap(),
        })
        .unwrap();
        assert_eq!(json["amount"].as_f64(), Some(42.5));
    }
}
