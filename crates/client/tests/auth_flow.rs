mod support;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;

use attachlink_client::{AuthError, Authenticator, VALIDATION_CLAIMS};
use support::Counter;

#[derive(Clone)]
struct AuthStub {
    tokens: Counter,
    validations: Counter,
    validate_status: StatusCode,
}

impl AuthStub {
    fn new(validate_status: StatusCode) -> Self {
        Self {
            tokens: Counter::new(),
            validations: Counter::new(),
            validate_status,
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/apiToken", get(api_token))
            .route("/ValidateSecurityToken", post(validate))
            .with_state(self.clone())
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
    #[serde(rename = "authToken")]
    auth_token: String,
}

async fn api_token(
    State(stub): State<AuthStub>,
    Query(query): Query<TokenQuery>,
) -> Json<serde_json::Value> {
    stub.tokens.bump();
    Json(json!({
        "apiToken": format!("tok-{}-{}", query.session_id, query.auth_token)
    }))
}

async fn validate(
    State(stub): State<AuthStub>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> StatusCode {
    stub.validations.bump();
    let bearer = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !bearer.starts_with("Bearer tok-") {
        return StatusCode::UNAUTHORIZED;
    }
    let claims: Vec<&str> = fields
        .iter()
        .filter(|(key, _)| key == "claims")
        .map(|(_, value)| value.as_str())
        .collect();
    if claims != VALIDATION_CLAIMS {
        return StatusCode::BAD_REQUEST;
    }
    if !fields
        .iter()
        .any(|(key, value)| key == "sessionId" && !value.is_empty())
    {
        return StatusCode::BAD_REQUEST;
    }
    stub.validate_status
}

#[tokio::test]
async fn authenticate_mints_and_validates_a_token() {
    let stub = AuthStub::new(StatusCode::OK);
    let addr = support::serve(stub.router()).await;
    let auth = Authenticator::new(reqwest::Client::new(), format!("http://{addr}"));

    let token = auth.authenticate("S1", "T1").await.expect("token");

    assert_eq!(token.as_str(), "tok-S1-T1");
    assert_eq!(stub.tokens.get(), 1);
    assert_eq!(stub.validations.get(), 1);
}

#[tokio::test]
async fn validation_rejection_is_terminal_without_retry() {
    let stub = AuthStub::new(StatusCode::UNAUTHORIZED);
    let addr = support::serve(stub.router()).await;
    let auth = Authenticator::new(reqwest::Client::new(), format!("http://{addr}"));

    let outcome = auth.authenticate("S1", "T1").await;

    assert_eq!(outcome, Err(AuthError::ValidationStatus(401)));
    assert_eq!(stub.tokens.get(), 1);
    assert_eq!(stub.validations.get(), 1);
}

#[tokio::test]
async fn body_without_api_token_is_rejected() {
    let app = Router::new().route(
        "/apiToken",
        get(|| async { Json(json!({ "unexpected": true })) }),
    );
    let addr = support::serve(app).await;
    let auth = Authenticator::new(reqwest::Client::new(), format!("http://{addr}"));

    assert!(matches!(
        auth.authenticate("S1", "T1").await,
        Err(AuthError::TokenBody(_))
    ));
}

#[tokio::test]
async fn token_endpoint_failure_reports_its_status() {
    let app = Router::new().route(
        "/apiToken",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let addr = support::serve(app).await;
    let auth = Authenticator::new(reqwest::Client::new(), format!("http://{addr}"));

    assert_eq!(
        auth.authenticate("S1", "T1").await,
        Err(AuthError::TokenStatus(503))
    );
}

#[tokio::test]
async fn unreachable_auth_service_is_a_request_error() {
    let addr = support::refused_addr().await;
    let auth = Authenticator::new(reqwest::Client::new(), format!("http://{addr}"));

    assert!(matches!(
        auth.authenticate("S1", "T1").await,
        Err(AuthError::TokenRequest(_))
    ));
}
