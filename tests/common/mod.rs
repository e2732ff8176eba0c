#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tech_moto_api::{
    middleware::auth::TokenService,
    models::{Collection, Document},
    payments::{NewPaymentIntent, PaymentError, PaymentGateway, PaymentIntent},
    routes::create_router,
    state::AppState,
    store::{Filter, MemoryStore, Store, Update},
};
use tower::ServiceExt;

pub const SECRET: &str = "test-secret";
pub const CLIENT_SECRET: &str = "pi_123_secret_456";

/// Records every intent it is asked for and answers with a fixed secret.
#[derive(Default)]
pub struct RecordingGateway {
    pub requests: Mutex<Vec<NewPaymentIntent>>,
    pub fail_with: Option<u16>,
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_payment_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentError> {
        self.requests.lock().expect("gateway lock").push(intent);
        if let Some(code) = self.fail_with {
            return Err(PaymentError::Rejected {
                status: reqwest::StatusCode::from_u16(code).expect("status code"),
                body: "card_declined".into(),
            });
        }
        Ok(PaymentIntent {
            client_secret: CLIENT_SECRET.into(),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<RecordingGateway>,
    pub tokens: TokenService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_gateway(RecordingGateway::default())
    }

    pub fn with_gateway(gateway: RecordingGateway) -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(gateway);
        let tokens = TokenService::new(SECRET, 10);
        let state = AppState::new(store.clone(), tokens.clone(), gateway.clone());
        Self {
            router: create_router(state),
            store,
            gateway,
            tokens,
        }
    }

    pub fn token_for(&self, email: &str) -> String {
        self.tokens.issue(email).expect("token")
    }

    /// Seeds a user document straight into the store with the given role.
    pub async fn seed_user(&self, email: &str, role: &str) {
        self.store
            .update_one(
                Collection::Users,
                &Filter::email(email),
                Update::set(doc(serde_json::json!({ "role": role }))),
                true,
            )
            .await
            .expect("seed user");
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }
}

pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
