use chrono::{DateTime, Utc};
use serde::Serialize;

use super::party::Party;

pub type UserId = i64;

/// A login account. Each party owns at most one.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: Party,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: Party,
    pub email: String,
    pub password_hash: String,
}

/// The account as shown to clients, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: Party,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}
