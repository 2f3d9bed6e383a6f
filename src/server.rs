//! HTTP front-end over a single session.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/status` | Loaded document, model, and turn count |
//! | `GET`  | `/history` | Conversation turns in order |
//! | `GET`  | `/examples` | Example questions |
//! | `POST` | `/upload?file_name=<name>` | Raw document body; `Content-Type` is the declared media type |
//! | `POST` | `/ask` | `{"question": "..."}` → `{"answer": "..."}` |
//! | `POST` | `/clear` | Clear the conversation, keep the document |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "unsupported_format", "message": "Unsupported file format: text/plain" } }
//! ```
//!
//! Error codes: `bad_request` (400), `unsupported_format` (415),
//! `malformed_document` (422), `inference_unreachable` (502),
//! `inference_failed` (502), `malformed_response` (502).
//!
//! The session sits behind one async mutex held for the whole action,
//! model round trip included, so actions never overlap.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::extract::ExtractionError;
use crate::inference::{InferenceError, OllamaClient};
use crate::models::ConversationTurn;
use crate::session::{Session, SessionStatus, UploadReport, EXAMPLE_QUESTIONS};

/// Upload size cap for `POST /upload`.
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

type SharedSession = Arc<Mutex<Session>>;

/// Starts the HTTP server on `[server].bind` with an Ollama-backed session.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let client = OllamaClient::new(&config.llm)?;
    let session = Session::new(Box::new(client), config.upload.clone());

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        model = %config.llm.model,
        llm = %config.llm.url,
        "server listening"
    );
    axum::serve(listener, router(session)).await?;
    Ok(())
}

/// Builds the router around an already constructed session.
pub fn router(session: Session) -> Router {
    let state: SharedSession = Arc::new(Mutex::new(session));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .route("/history", get(handle_history))
        .route("/examples", get(handle_examples))
        .route("/upload", post(handle_upload))
        .route("/ask", post(handle_ask))
        .route("/clear", post(handle_clear))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        let (status, code) = match err {
            ExtractionError::UnsupportedFormat(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_format")
            }
            ExtractionError::MalformedDocument(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "malformed_document")
            }
        };
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        let code = match err {
            InferenceError::Unreachable(_) => "inference_unreachable",
            InferenceError::RemoteFailure(_) => "inference_failed",
            InferenceError::MalformedResponse => "malformed_response",
        };
        AppError {
            status: StatusCode::BAD_GATEWAY,
            code,
            message: err.to_string(),
        }
    }
}

// ============ Handlers ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_status(State(session): State<SharedSession>) -> Json<SessionStatus> {
    Json(session.lock().await.status())
}

#[derive(Serialize)]
struct HistoryResponse {
    turns: Vec<ConversationTurn>,
}

async fn handle_history(State(session): State<SharedSession>) -> Json<HistoryResponse> {
    let session = session.lock().await;
    Json(HistoryResponse {
        turns: session.snapshot().turns.to_vec(),
    })
}

#[derive(Serialize)]
struct ExamplesResponse {
    questions: &'static [&'static str],
}

async fn handle_examples() -> Json<ExamplesResponse> {
    Json(ExamplesResponse {
        questions: EXAMPLE_QUESTIONS,
    })
}

#[derive(Deserialize)]
struct UploadParams {
    file_name: Option<String>,
}

async fn handle_upload(
    State(session): State<SharedSession>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadReport>, AppError> {
    let media_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let file_name = params.file_name.unwrap_or_else(|| "upload".to_string());

    let report = session
        .lock()
        .await
        .upload(&body, media_type, &file_name)?;
    Ok(Json(report))
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
}

async fn handle_ask(
    State(session): State<SharedSession>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    if req.question.trim().is_empty() {
        return Err(bad_request("question must not be empty"));
    }
    let answer = session.lock().await.ask(&req.question).await?;
    Ok(Json(AskResponse { answer }))
}

async fn handle_clear(State(session): State<SharedSession>) -> StatusCode {
    session.lock().await.clear();
    StatusCode::NO_CONTENT
}
