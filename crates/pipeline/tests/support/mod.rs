use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::json;

/// Shared call counter for asserting how often a route was hit.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-process stand-in for the auth and lookup services, with counters for
/// every route.
#[derive(Clone, Default)]
pub struct ServiceStub {
    pub token_calls: Counter,
    pub validate_calls: Counter,
    pub lookup_calls: Counter,
    /// Session id whose validation the stub rejects with 401.
    pub reject_session: Option<String>,
}

impl ServiceStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(session_id: &str) -> Self {
        Self {
            reject_session: Some(session_id.to_string()),
            ..Self::default()
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/auth/apiToken", get(api_token))
            .route("/auth/ValidateSecurityToken", post(validate))
            .route("/svc/lookup", get(lookup))
            .route("/svc/empty", get(empty))
            .with_state(self.clone())
    }

    /// Serves the stub on an ephemeral port for the rest of the test.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub");
        });
        addr
    }
}

async fn api_token(
    State(stub): State<ServiceStub>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    stub.token_calls.bump();
    let session = query.get("sessionId").cloned().unwrap_or_default();
    Json(json!({ "apiToken": format!("tok-{session}") }))
}

async fn validate(
    State(stub): State<ServiceStub>,
    Form(fields): Form<Vec<(String, String)>>,
) -> StatusCode {
    stub.validate_calls.bump();
    let session = fields
        .iter()
        .find(|(key, _)| key == "sessionId")
        .map(|(_, value)| value.as_str())
        .unwrap_or_default();
    if stub.reject_session.as_deref() == Some(session) {
        return StatusCode::UNAUTHORIZED;
    }
    StatusCode::OK
}

/// Answers `<value>https://files.example/{reference}</value>` where the
/// reference is recovered from the wire argument, proving the argument
/// round-trips through the codec.
async fn lookup(
    State(stub): State<ServiceStub>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    stub.lookup_calls.bump();
    if query.get("env").map_or(true, |env| env.is_empty()) {
        return (StatusCode::BAD_REQUEST, String::new());
    }
    let argument = query.get("arg").cloned().unwrap_or_default();
    let plain = attachlink_codec::decode(&argument);
    let reference = plain.rsplit(':').next().unwrap_or_default().to_string();
    (
        StatusCode::OK,
        format!("<value>https://files.example/{reference}</value>"),
    )
}

async fn empty(State(stub): State<ServiceStub>) -> String {
    stub.lookup_calls.bump();
    String::new()
}
