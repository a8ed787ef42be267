//! Session tokens and password hashing for the two accounts.

pub mod password;
pub mod token;

pub use token::{Claims, TokenError, TokenSigner};

use crate::domain::{Party, UserId};

/// The authenticated caller, attached to each request by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: Party,
    pub email: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
        }
    }
}
