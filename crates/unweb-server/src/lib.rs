//! HTTP API for unweb.
//!
//! | Method | Path                  | Body                      |
//! |--------|-----------------------|---------------------------|
//! | POST   | `/api/convert/paste`  | JSON `{ "html": "..." }`  |
//! | POST   | `/api/convert/upload` | multipart, field `file`   |
//! | POST   | `/api/convert/url`    | JSON `{ "url": "..." }`   |
//! | GET    | `/health`             | none                      |
//!
//! Successful conversions answer `200` with `{ "markdown", "warnings" }`.
//! Failures answer `{ "error": "<message>" }` with the status given by
//! [`unweb::ErrorCategory::http_status`]. Internal failures only ever expose
//! the short message; details stay in the server log.

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use unweb::{ConversionError, ConversionResult, Converter, UnwebError, UploadError};

/// Room for multipart framing and JSON escaping on top of the document limits.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

// ── State ────────────────────────────────────────────────────────────────

/// Shared, read-only server state.
#[derive(Clone, Debug)]
pub struct AppState {
    converter: Converter,
    cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(converter: Converter) -> Self {
        Self {
            converter,
            cors_origins: Vec::new(),
        }
    }

    /// Restrict CORS to these origins. Empty allows any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    fn body_limit(&self) -> usize {
        let policy = &self.converter.config().policy;
        let largest = policy.max_upload_bytes.max(policy.max_content_bytes);
        usize::try_from(largest)
            .unwrap_or(usize::MAX)
            .saturating_add(BODY_LIMIT_SLACK)
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);
    let body_limit = state.body_limit();

    Router::new()
        .route("/health", get(health))
        .route("/api/convert/paste", post(convert_paste))
        .route("/api/convert/upload", post(convert_upload))
        .route("/api/convert/url", post(convert_url))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(parsed))
}

// ── Error mapping ────────────────────────────────────────────────────────

/// An error rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn task_failed(e: tokio::task::JoinError) -> Self {
        error!("Conversion task failed: {}", e);
        ConversionError::internal(e.to_string()).into()
    }

    fn multipart(e: MultipartError) -> Self {
        warn!("Rejected multipart body: {}", e.body_text());
        Self {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<UnwebError> for ApiError {
    fn from(e: UnwebError) -> Self {
        let category = e.category();
        let status =
            StatusCode::from_u16(category.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed [{}]: {}", category, e);
        } else {
            warn!("Request rejected [{}]: {}", category, e);
        }
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<ConversionError> for ApiError {
    fn from(e: ConversionError) -> Self {
        UnwebError::from(e).into()
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        UnwebError::from(e).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PasteRequest {
    #[serde(default)]
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    pub url: String,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn convert_paste(
    State(state): State<AppState>,
    Json(req): Json<PasteRequest>,
) -> Result<Json<ConversionResult>, ApiError> {
    if req.html.trim().is_empty() {
        return Err(ApiError::bad_request("HTML content is required"));
    }

    let converter = state.converter.clone();
    let result = tokio::task::spawn_blocking(move || converter.convert_html(&req.html))
        .await
        .map_err(ApiError::task_failed)??;
    Ok(Json(result))
}

async fn convert_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConversionResult>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(ApiError::multipart)? {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(ApiError::multipart)?;
            upload = Some((file_name, bytes));
            break;
        }
    }
    let (file_name, bytes) = upload.ok_or(UploadError::MissingFile)?;
    info!("Upload '{}' ({} bytes)", file_name, bytes.len());

    let converter = state.converter.clone();
    let result = tokio::task::spawn_blocking(move || converter.convert_upload(&file_name, &bytes))
        .await
        .map_err(ApiError::task_failed)??;
    Ok(Json(result))
}

async fn convert_url(
    State(state): State<AppState>,
    Json(req): Json<UrlRequest>,
) -> Result<Json<ConversionResult>, ApiError> {
    let url = req.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }

    let result = state.converter.convert_url(url).await?;
    Ok(Json(result))
}
