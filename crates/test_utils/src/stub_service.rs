//! Stub Prediction Service
//!
//! An axum server bound to an ephemeral port on 127.0.0.1 that speaks the
//! prediction service's HTTP contract. Each endpoint answers with a scripted
//! status and body, and every request is recorded for later inspection.
//!
//! ```rust,ignore
//! let stub = StubService::start().await;
//! stub.fail_predictions(400, json!({"error": "model not loaded"})).await;
//! let adapter = HttpPredictionAdapter::new(PredictionServiceConfig {
//!     base_url: stub.url(),
//!     timeout_secs: 5,
//! })?;
//! ```

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// A scripted reply
#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub body: Value,
}

impl StubReply {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn status(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// A request received by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: &'static str,
    pub request_id: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug)]
struct StubState {
    root: RwLock<StubReply>,
    predict: RwLock<StubReply>,
    model_info: RwLock<StubReply>,
    requests: RwLock<Vec<RecordedRequest>>,
}

/// Running stub service; shut down when dropped
pub struct StubService {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubService {
    /// Starts a healthy stub that approves every application
    pub async fn start() -> Self {
        let state = Arc::new(StubState {
            root: RwLock::new(StubReply::ok(json!({
                "message": "Loan Prediction API is running",
                "status": "healthy",
                "model_loaded": true
            }))),
            predict: RwLock::new(StubReply::ok(json!({
                "prediction": "Approved",
                "confidence": 0.91,
                "input_data": {}
            }))),
            model_info: RwLock::new(StubReply::ok(json!({
                "model_type": "RandomForestClassifier",
                "features": ["Gender", "Married", "Credit_History"],
                "model_loaded": true
            }))),
            requests: RwLock::new(Vec::new()),
        });

        let router = Router::new()
            .route("/", get(root))
            .route("/predict", post(predict))
            .route("/model-info", get(model_info))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub service");
        let addr = listener.local_addr().expect("Stub service has no local address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, state, handle }
    }

    /// Base URL of the stub
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Sets the reply to `GET /`
    pub async fn set_root(&self, reply: StubReply) {
        *self.state.root.write().await = reply;
    }

    /// Sets the reply to `POST /predict`
    pub async fn set_predict(&self, reply: StubReply) {
        *self.state.predict.write().await = reply;
    }

    /// Makes `POST /predict` answer with a failure status
    pub async fn fail_predictions(&self, status: u16, body: Value) {
        self.set_predict(StubReply::status(status, body)).await;
    }

    /// Sets the reply to `GET /model-info`
    pub async fn set_model_info(&self, reply: StubReply) {
        *self.state.model_info.write().await = reply;
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.read().await.clone()
    }

    /// Requests received on one path
    pub async fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn reply(state: &StubState, path: &'static str, headers: &HeaderMap, body: Option<Value>) -> (StatusCode, Json<Value>) {
    state.requests.write().await.push(RecordedRequest {
        path,
        request_id: headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let reply = match path {
        "/" => state.root.read().await.clone(),
        "/predict" => state.predict.read().await.clone(),
        _ => state.model_info.read().await.clone(),
    };
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body))
}

async fn root(State(state): State<Arc<StubState>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    reply(&state, "/", &headers, None).await
}

async fn predict(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    reply(&state, "/predict", &headers, Some(body)).await
}

async fn model_info(State(state): State<Arc<StubState>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    reply(&state, "/model-info", &headers, None).await
}
