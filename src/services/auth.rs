use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{Claims, TokenError, TokenSigner};
use crate::domain::{NewUser, Party, PublicUser, User, UserId};
use crate::error::AppError;
use crate::ports::{RepositoryError, UserStore};
use crate::validation::{
    is_missing, parse_party, validate_email, validate_password, ValidationError, ValidationKind,
};

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<Value>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameAvailability {
    pub success: bool,
    pub available_names: Vec<Party>,
    pub taken_names: Vec<Party>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Registration, login and token checks for the two accounts.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    signer: Arc<TokenSigner>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, signer: Arc<TokenSigner>) -> Self {
        Self { users, signer }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        let name = request.name.as_ref().filter(|value| !is_missing(Some(*value)));
        let email = non_blank(&request.email);
        let password = non_blank(&request.password);
        let fields = [
            ("name", name.is_some()),
            ("email", email.is_some()),
            ("password", password.is_some()),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, present)| !present)
            .map(|(field, _)| *field)
            .collect();

        let (Some(name), Some(email), Some(password)) = (name, email, password)
        else {
            return Err(ValidationError::missing(&missing).into());
        };

        let name = parse_party(ValidationKind::InvalidName, "name", name)?;
        validate_password(password)?;
        let email = normalize_email(email);
        validate_email(&email)?;

        // One account per person.
        if self.users.find_by_name(name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "An account for {} already exists. Registration is limited to one account per person.",
                name
            )));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("This email is already in use".to_string()));
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let user = self
            .users
            .create(&NewUser {
                name,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Duplicate(field) => {
                    AppError::Conflict(format!("{} is already registered", field))
                }
                other => other.into(),
            })?;

        let token = self.issue_token(&user)?;
        tracing::info!(user_id = user.id, name = %user.name, "User registered");

        Ok(AuthResponse {
            message: "User created successfully".to_string(),
            token,
            user: PublicUser::from(&user),
        })
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AppError> {
        let (Some(email), Some(password)) = (non_blank(&request.email), non_blank(&request.password))
        else {
            return Err(ValidationError::missing(&["email", "password"]).into());
        };

        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(invalid)?;

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if !matches {
            tracing::warn!(user_id = user.id, "Login rejected: wrong password");
            return Err(invalid());
        }

        let token = self.issue_token(&user)?;
        tracing::info!(user_id = user.id, name = %user.name, "User logged in");

        Ok(AuthResponse {
            message: "Login successful".to_string(),
            token,
            user: PublicUser::from(&user),
        })
    }

    pub async fn available_names(&self) -> Result<NameAvailability, AppError> {
        let taken_names = self.users.taken_names().await?;
        let available_names = Party::ALL
            .into_iter()
            .filter(|party| !taken_names.contains(party))
            .collect();

        Ok(NameAvailability {
            success: true,
            available_names,
            taken_names,
        })
    }

    pub async fn current_user(&self, id: UserId) -> Result<PublicUser, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .map(|user| PublicUser::from(&user))
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.signer.verify(token)
    }

    fn issue_token(&self, user: &User) -> Result<String, AppError> {
        self.signer
            .issue(user, Utc::now())
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}
