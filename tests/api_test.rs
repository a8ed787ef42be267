use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use duo_ledger::adapters::{InMemoryLedgerStore, InMemoryUserStore};
use duo_ledger::auth::TokenSigner;
use duo_ledger::domain::{NewUser, Party};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use duo_ledger::domain::{NewTransaction, Transaction, TransactionId};
use duo_ledger::ports::{LedgerStore, RepositoryError, RepositoryResult, UserStore};
use std::collections::HashMap;
use duo_ledger::{create_app, AppState, HttpOptions};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";

struct TestApp {
    router: Router,
    token: String,
}

async fn setup() -> TestApp {
    setup_with(Arc::new(InMemoryLedgerStore::new()), HttpOptions::default()).await
}

async fn setup_with(ledger: Arc<dyn LedgerStore>, http: HttpOptions) -> TestApp {
    let users = Arc::new(InMemoryUserStore::new());
    let amina = users
        .create(&NewUser {
            name: Party::Amina,
            email: "amina@example.com".to_string(),
            password_hash: "unused".to_string(),
        })
        .await
        .unwrap();

    let token = TokenSigner::new(SECRET, Duration::hours(1))
        .issue(&amina, Utc::now())
        .unwrap();

    let state = AppState::new(
        ledger,
        users,
        TokenSigner::new(SECRET, Duration::hours(1)),
        http,
    );

    TestApp {
        router: create_app(state),
        token,
    }
}

impl TestApp {
    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", self.token));
        let body = match body {
            Some(json) => {
                let payload = json.to_string();
                builder = builder
                    .header("Content-Type", "application/json")
                    .header("Content-Length", payload.len());
                Body::from(payload)
            }
            None => Body::empty(),
        };

        send(&self.router, builder.body(body).unwrap()).await
    }

    async fn create(&self, payer: &str, amount: Value, description: &str) -> Value {
        let (status, body) = self
            .send(
                "POST",
                "/transactions",
                Some(json!({"payer": payer, "amount": amount, "description": description})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "body: {}", body);
        body["data"].clone()
    }

    async fn debts(&self) -> (f64, f64) {
        let (status, body) = self.send("GET", "/transactions/debts", None).await;
        assert_eq!(status, StatusCode::OK);
        (
            body["data"]["nanouOwesAmina"].as_f64().unwrap(),
            body["data"]["aminaOwesNanou"].as_f64().unwrap(),
        )
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_is_public() {
    let app = setup().await;
    let (status, body) = send(
        &app.router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["db"], "connected");
}

#[tokio::test]
async fn test_ledger_requires_token() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        Request::builder().uri("/transactions").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let forged = TokenSigner::new("some-other-secret-value", Duration::hours(1));
    let (status, _) = send(
        &app.router,
        Request::builder()
            .uri("/transactions")
            .header(
                "Authorization",
                format!("Bearer {}", forged_token(&forged).await),
            )
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

async fn forged_token(signer: &TokenSigner) -> String {
    let users = InMemoryUserStore::new();
    let user = users
        .create(&NewUser {
            name: Party::Nanou,
            email: "nanou@example.com".to_string(),
            password_hash: "unused".to_string(),
        })
        .await
        .unwrap();
    signer.issue(&user, Utc::now()).unwrap()
}

#[tokio::test]
async fn test_create_list_and_debts() {
    let app = setup().await;

    let created = app.create("Amina", json!(30), "groceries").await;
    assert_eq!(created["status"], "unpaid");
    assert_eq!(created["paidAt"], Value::Null);
    assert_eq!(created["amount"].as_f64(), Some(30.0));
    app.create("Nanou", json!("10"), "bread").await;

    let (status, body) = app.send("GET", "/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    assert_eq!(app.debts().await, (20.0, 0.0));

    let uri = format!("/transactions/{}/pay", created["id"]);
    let (status, body) = app.send("PUT", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "paid");
    assert!(body["data"]["paidAt"].is_string());

    assert_eq!(app.debts().await, (0.0, 10.0));

    let (status, body) = app.send("PUT", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Transaction not found or already paid");
}

#[tokio::test]
async fn test_equal_outlay_balances() {
    let app = setup().await;
    app.create("Amina", json!(15), "x").await;
    app.create("Nanou", json!(15), "y").await;

    assert_eq!(app.debts().await, (0.0, 0.0));
}

#[tokio::test]
async fn test_delete_transaction() {
    let app = setup().await;
    let created = app.create("Nanou", json!(12.5), "cinema").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app.send("DELETE", &format!("/transactions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Transaction deleted successfully");

    let (status, _) = app.send("DELETE", &format!("/transactions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .send("PUT", &format!("/transactions/{}/pay", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rejects_invalid_transactions() {
    let app = setup().await;
    let cases = [
        (json!({"payer": "Amina", "amount": 0, "description": "x"}), "Invalid amount"),
        (json!({"payer": "Amina", "amount": -5, "description": "x"}), "Invalid amount"),
        (json!({"payer": "Someone", "amount": 5, "description": "x"}), "Invalid payer"),
        (json!({"payer": "Amina", "amount": 5, "description": ""}), "Invalid description"),
        (json!({"payer": "Amina"}), "Missing required fields"),
    ];

    for (body, expected) in cases {
        let (status, response) = app.send("POST", "/transactions", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["success"], false);
        assert_eq!(response["error"], expected);
    }

    let (_, body) = app.send("GET", "/transactions", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejects_malformed_body_and_ids() {
    let app = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/transactions")
        .header("Authorization", format!("Bearer {}", app.token))
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app.send("PUT", "/transactions/abc/pay", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid ID");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = setup().await;

    let (status, names) = send(
        &app.router,
        Request::builder()
            .uri("/auth/available-names")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names["availableNames"], json!(["Nanou"]));
    assert_eq!(names["takenNames"], json!(["Amina"]));

    let register = |body: Value| {
        Request::builder()
            .method("POST")
            .uri("/auth/register")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let (status, body) = send(
        &app.router,
        register(json!({"name": "Nanou", "email": "nanou@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["name"], "Nanou");
    assert!(body["user"].get("password_hash").is_none());

    let (status, _) = send(
        &app.router,
        register(json!({"name": "Nanou", "email": "other@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app.router,
        Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({"email": "nanou@example.com", "password": "wrong-password"}).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app.router,
        Request::builder()
            .uri("/auth/me")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "nanou@example.com");
}

/// Ledger whose backing database is always unreachable.
struct UnreachableLedger;

fn unreachable() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl LedgerStore for UnreachableLedger {
    async fn insert(&self, _tx: &NewTransaction) -> RepositoryResult<Transaction> {
        Err(unreachable())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Transaction>> {
        Err(unreachable())
    }

    async fn mark_paid(&self, _id: TransactionId) -> RepositoryResult<Option<Transaction>> {
        Err(unreachable())
    }

    async fn delete(&self, _id: TransactionId) -> RepositoryResult<bool> {
        Err(unreachable())
    }

    async fn sum_unpaid_by_payer(&self) -> RepositoryResult<HashMap<Party, BigDecimal>> {
        Err(unreachable())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        Err(unreachable())
    }
}

#[tokio::test]
async fn test_internal_errors_hidden_in_production() {
    let app = setup_with(Arc::new(UnreachableLedger), HttpOptions::default()).await;

    let (status, body) = app.send("GET", "/transactions", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["message"], "Something went wrong");
}

#[tokio::test]
async fn test_internal_errors_exposed_in_development() {
    let http = HttpOptions {
        expose_internal_errors: true,
        ..HttpOptions::default()
    };
    let app = setup_with(Arc::new(UnreachableLedger), http).await;

    let (status, body) = app.send("GET", "/transactions/debts", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("pool timed out"));

    // Client errors keep their own message.
    let (status, body) = app.send("PUT", "/transactions/abc/pay", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid ID");
}

#[tokio::test]
async fn test_unhealthy_store_reports_503() {
    let app = setup_with(Arc::new(UnreachableLedger), HttpOptions::default()).await;
    let (status, body) = send(
        &app.router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["db"], "disconnected");
}

#[tokio::test]
async fn test_body_logging_accepts_long_descriptions() {
    let http = HttpOptions {
        log_request_body: true,
        ..HttpOptions::default()
    };
    let app = setup_with(Arc::new(InMemoryLedgerStore::new()), http).await;
    let description = "weekly groceries ".repeat(200);

    let created = app.create("Amina", json!(18.5), &description).await;
    assert_eq!(created["description"], description.trim());
}
