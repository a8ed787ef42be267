//! Net balance between the two parties.
//!
//! Only the unpaid pool counts: a paid transaction has been reimbursed and is
//! dropped from both totals. Whoever fronted more unpaid money is owed the
//! difference.

use bigdecimal::BigDecimal;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use super::amount;
use super::party::Party;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtSummary {
    #[serde(serialize_with = "amount::serialize_as_number")]
    #[schema(value_type = f64)]
    pub nanou_owes_amina: BigDecimal,
    #[serde(serialize_with = "amount::serialize_as_number")]
    #[schema(value_type = f64)]
    pub amina_owes_nanou: BigDecimal,
}

impl DebtSummary {
    /// Nets Amina's unpaid outlay against Nanou's.
    pub fn net(amina_unpaid: &BigDecimal, nanou_unpaid: &BigDecimal) -> Self {
        let zero = BigDecimal::from(0);
        let net = amina_unpaid - nanou_unpaid;

        if net > zero {
            Self {
                nanou_owes_amina: net,
                amina_owes_nanou: zero,
            }
        } else if net < zero {
            Self {
                nanou_owes_amina: zero,
                amina_owes_nanou: net.abs(),
            }
        } else {
            Self::balanced()
        }
    }

    /// A party with no unpaid transactions contributes zero.
    pub fn from_unpaid_totals(totals: &HashMap<Party, BigDecimal>) -> Self {
        let zero = BigDecimal::from(0);
        let amina = totals.get(&Party::Amina).unwrap_or(&zero);
        let nanou = totals.get(&Party::Nanou).unwrap_or(&zero);
        Self::net(amina, nanou)
    }

    pub fn balanced() -> Self {
        Self {
            nanou_owes_amina: BigDecimal::from(0),
            amina_owes_nanou: BigDecimal::from(0),
        }
    }

    pub fn is_balanced(&self) -> bool {
        let zero = BigDecimal::from(0);
        self.nanou_owes_amina == zero && self.amina_owes_nanou == zero
    }
}
