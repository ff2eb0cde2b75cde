//! Shared fixtures for router-level tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use futures_util::future::BoxFuture;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use hush_ai::{AiError, ContentModel};
use hush_db::Database;

use crate::auth::create_token;
use crate::build_router;
use crate::state::{AppState, AppStateInner};

pub const TEST_SECRET: &str = "test-secret";

/// Model stub that returns a fixed reply and counts calls.
pub struct StubModel {
    reply: Result<String, u16>,
    calls: AtomicUsize,
}

impl StubModel {
    pub fn replying(text: &str) -> Self {
        Self { reply: Ok(text.to_string()), calls: AtomicUsize::new(0) }
    }

    pub fn failing(status: u16) -> Self {
        Self { reply: Err(status), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContentModel for StubModel {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, AiError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(AiError::Upstream { status: *status, body: "unavailable".into() }),
        };
        Box::pin(async move { reply })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub model: Arc<StubModel>,
}

impl TestApp {
    /// Insert a user directly and return its id with a valid session token.
    pub fn seed_user(&self, username: &str) -> (Uuid, String) {
        let id = Uuid::new_v4();
        self.state.db.create_user(&id.to_string(), username, "unused-hash").unwrap();
        let token = create_token(TEST_SECRET, id, username).unwrap();
        (id, token)
    }
}

pub fn test_app(model: StubModel) -> TestApp {
    let model = Arc::new(model);
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: TEST_SECRET.to_string(),
        model: model.clone(),
    });

    TestApp {
        router: build_router(state.clone()),
        state,
        model,
    }
}

/// Issue one request and decode the JSON body (`Null` when empty).
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
