use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::map_db_error;
use crate::domain::{NewUser, Party, User, UserId};
use crate::ports::{RepositoryError, RepositoryResult, UserStore};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";

#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, value: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {filter} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(UserRow::into_domain).transpose()
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create(&self, user: &NewUser) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.name.as_str())
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.into_domain()
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn find_by_name(&self, name: Party) -> RepositoryResult<Option<User>> {
        self.find_one("name", name.as_str()).await
    }

    async fn taken_names(&self) -> RepositoryResult<Vec<Party>> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM users ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        names
            .into_iter()
            .map(|name| {
                name.parse::<Party>()
                    .map_err(|e| RepositoryError::Corrupt(e.to_string()))
            })
            .collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> RepositoryResult<User> {
        let name = self
            .name
            .parse::<Party>()
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;

        Ok(User {
            id: self.id,
            name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}
