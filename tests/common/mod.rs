//! In-process stand-in for the hospital backend API.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use hospitalsrv::actions::ActionContext;
use hospitalsrv::config::Config;
use hospitalsrv::services::http_client::ApiClient;
use hospitalsrv::services::render_cache::RenderCache;
use hospitalsrv::services::token_store::CookieTokenStore;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path and query with the API prefix stripped.
    pub uri: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone)]
pub struct MockRoute {
    method: Method,
    path: String,
    status: StatusCode,
    body: Value,
}

impl MockRoute {
    pub fn new(method: Method, path: &str, status: u16, body: Value) -> Self {
        Self {
            method,
            path: path.to_string(),
            status: StatusCode::from_u16(status).unwrap(),
            body,
        }
    }
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Vec<MockRoute>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockBackend {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    pub async fn start(routes: Vec<MockRoute>) -> Self {
        let state = MockState {
            routes: Arc::new(routes),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();

        let app = Router::new().fallback(handle).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}{}", addr, API_PREFIX),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn config(&self) -> Config {
        Config::with_backend(self.base_url.clone())
    }
}

async fn handle(State(state): State<MockState>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let uri = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let (authorization, content_type) = {
        let header_value = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        (
            header_value(header::AUTHORIZATION),
            header_value(header::CONTENT_TYPE),
        )
    };
    let body = to_bytes(request.into_body(), usize::MAX)
        .await
        .map(|b| b.to_vec())
        .unwrap_or_default();

    let local_path = path.strip_prefix(API_PREFIX).unwrap_or(&path).to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        uri: uri.strip_prefix(API_PREFIX).unwrap_or(&uri).to_string(),
        authorization,
        content_type,
        body,
    });

    match state
        .routes
        .iter()
        .find(|r| r.method == method && r.path == local_path)
    {
        Some(route) if route.body.is_null() => (route.status, Body::empty()).into_response(),
        Some(route) => (route.status, Json(route.body.clone())).into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "message": "no route" })))
            .into_response(),
    }
}

pub struct TestContext {
    pub ctx: ActionContext,
    pub tokens: Arc<CookieTokenStore>,
    pub render_cache: Arc<RenderCache>,
}

pub fn context_for(config: &Config) -> TestContext {
    let tokens = Arc::new(CookieTokenStore::empty(false));
    let render_cache = Arc::new(RenderCache::new(Duration::from_secs(60)));
    let ctx = ActionContext::new(
        ApiClient::new(config).unwrap(),
        tokens.clone(),
        render_cache.clone(),
    );
    TestContext {
        ctx,
        tokens,
        render_cache,
    }
}
