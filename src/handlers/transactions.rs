use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::json_body;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::domain::{DebtSummary, Transaction};
use crate::error::AppError;
use crate::services::CreateTransaction;

#[utoipa::path(
    get,
    path = "/transactions",
    responses(
        (status = 200, description = "All transactions, newest first", body = [Transaction]),
        (status = 401, description = "Missing access token"),
        (status = 403, description = "Invalid access token")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let transactions = state.transactions.list_transactions().await?;

    Ok(Json(json!({
        "success": true,
        "data": transactions,
    })))
}

#[utoipa::path(
    post,
    path = "/transactions",
    request_body = CreateTransaction,
    responses(
        (status = 201, description = "Transaction created", body = Transaction),
        (status = 400, description = "Missing or invalid field")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<CreateTransaction>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(body)?;
    let transaction = state
        .transactions
        .create_transaction(&request, user.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": transaction,
            "message": "Transaction created successfully",
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/transactions/{id}/pay",
    params(("id" = i64, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction marked as paid", body = Transaction),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Transaction not found or already paid")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn pay_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = state.transactions.pay_transaction(&id, user.name).await?;

    Ok(Json(json!({
        "success": true,
        "data": transaction,
        "message": "Transaction marked as paid",
    })))
}

#[utoipa::path(
    delete,
    path = "/transactions/{id}",
    params(("id" = i64, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Transaction does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.transactions.delete_transaction(&id, user.name).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Transaction deleted successfully",
    })))
}

/// Net balance over unpaid transactions.
#[utoipa::path(
    get,
    path = "/transactions/debts",
    responses(
        (status = 200, description = "Who owes whom", body = DebtSummary)
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn get_debts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let debts = state.transactions.get_debt_summary().await?;

    Ok(Json(json!({
        "success": true,
        "data": debts,
    })))
}
