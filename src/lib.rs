pub mod adapters;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod services;
pub mod utils;
pub mod validation;

use axum::{
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::TokenSigner;
use crate::middleware::request_logger::{request_logger_middleware, RequestLogSettings};
use crate::ports::{LedgerStore, UserStore};
use crate::services::{AuthService, TransactionService};

/// HTTP-level knobs that do not belong to any service.
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    pub cors_allowed_origin: Option<String>,
    pub log_request_body: bool,
    /// Development only: 5xx bodies carry the underlying error text.
    pub expose_internal_errors: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub transactions: TransactionService,
    pub auth: AuthService,
    pub http: HttpOptions,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        users: Arc<dyn UserStore>,
        signer: TokenSigner,
        http: HttpOptions,
    ) -> Self {
        Self {
            transactions: TransactionService::new(ledger),
            auth: AuthService::new(users, Arc::new(signer)),
            http,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::transactions::list_transactions,
        handlers::transactions::create_transaction,
        handlers::transactions::pay_transaction,
        handlers::transactions::delete_transaction,
        handlers::transactions::get_debts,
    ),
    components(schemas(
        handlers::HealthStatus,
        domain::Transaction,
        domain::TransactionStatus,
        domain::Party,
        domain::DebtSummary,
        services::CreateTransaction,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Transactions", description = "Shared expense ledger"),
        (name = "Health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Any origin when none is configured. An unparsable origin allows none.
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match origin {
        None => layer.allow_origin(Any),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => layer.allow_origin(value),
            Err(e) => {
                tracing::error!(origin, error = %e, "Ignoring unparsable CORS origin");
                layer
            }
        },
    }
}

pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/transactions",
            get(handlers::transactions::list_transactions)
                .post(handlers::transactions::create_transaction),
        )
        .route("/transactions/debts", get(handlers::transactions::get_debts))
        .route(
            "/transactions/:id/pay",
            put(handlers::transactions::pay_transaction),
        )
        .route(
            "/transactions/:id",
            delete(handlers::transactions::delete_transaction),
        )
        .route("/auth/me", get(handlers::auth::me))
        .route_layer(from_fn_with_state(
            state.auth.clone(),
            middleware::auth::require_auth,
        ));

    let log_settings = RequestLogSettings {
        log_body: state.http.log_request_body,
    };
    let cors = cors_layer(state.http.cors_allowed_origin.as_deref());

    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/available-names", get(handlers::auth::available_names))
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(from_fn_with_state(
            state.http.expose_internal_errors,
            error::expose_error_detail,
        ))
        .layer(from_fn_with_state(log_settings, request_logger_middleware))
        .layer(cors)
        .with_state(state)
}
