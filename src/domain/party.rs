use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// One of the two people sharing the ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum Party {
    Amina,
    Nanou,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown party: {0}")]
pub struct UnknownParty(pub String);

impl Party {
    pub const ALL: [Party; 2] = [Party::Amina, Party::Nanou];

    pub fn as_str(&self) -> &'static str {
        match self {
            Party::Amina => "Amina",
            Party::Nanou => "Nanou",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Party {
    type Err = UnknownParty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Party::ALL
            .into_iter()
            .find(|party| party.as_str() == s)
            .ok_or_else(|| UnknownParty(s.to_string()))
    }
}
