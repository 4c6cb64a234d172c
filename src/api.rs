use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};

use crate::config::Config;
use crate::crawler::{CrawlRequest, CrawlResults, Crawler};
use crate::youtube::Comment;

pub const SERVICE_NAME: &str = "YouTube Comment Crawler API";

pub struct AppState {
    pub crawler: Crawler,
}

impl AppState {
    pub fn new(crawler: Crawler) -> Self {
        Self { crawler }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "YouTube Comment Crawler API",
        version = "1.0",
        description = "API for crawling YouTube comments"
    ),
    paths(health, crawl),
    components(schemas(CrawlRequest, Comment, CrawlResponse, ErrorBody, Health)),
    tags((name = "api", description = "YouTube crawler operations"))
)]
pub struct ApiDoc;

#[derive(Serialize, ToSchema)]
struct Health {
    status: String,
    service: String,
}

#[derive(Serialize, ToSchema)]
struct CrawlResponse {
    /// Operation success status
    success: bool,
    /// Number of videos with matching comments
    video_count: usize,
    /// Matching comments keyed by video URL
    #[schema(value_type = HashMap<String, Vec<Comment>>)]
    results: CrawlResults,
}

#[derive(Serialize, ToSchema)]
struct ErrorBody {
    error: String,
}

/// Error body returned by every failing endpoint: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "Not found".to_string(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/crawl", post(crawl))
        .route("/", get(swagger_ui))
        .route("/swagger.json", get(openapi_json))
        .fallback(fallback)
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &Config, state: Arc<AppState>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "api",
    responses((status = 200, description = "Service is up", body = Health))
)]
async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/api/crawl",
    tag = "api",
    request_body = CrawlRequest,
    responses(
        (status = 200, description = "Matching comments by video", body = CrawlResponse),
        (status = 400, description = "Invalid request parameters", body = ErrorBody),
        (status = 500, description = "Crawl failed", body = ErrorBody)
    )
)]
async fn crawl(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<CrawlResponse>, ApiError> {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let request = parse_crawl_request(&payload)?;

    let results = state
        .crawler
        .crawl_channel_comments(&request)
        .await
        .map_err(|e| {
            tracing::error!(channel_id = %request.channel_id, error = %e, "crawl failed");
            ApiError::internal(e.to_string())
        })?;

    Ok(Json(CrawlResponse {
        success: true,
        video_count: results.len(),
        results,
    }))
}

fn parse_crawl_request(payload: &Value) -> Result<CrawlRequest, ApiError> {
    let Some(channel_id) = payload.as_object().and_then(|o| o.get("channel_id")) else {
        return Err(ApiError::bad_request("Missing channel_id parameter"));
    };
    let channel_id = channel_id
        .as_str()
        .ok_or_else(|| ApiError::bad_request("channel_id must be a string"))?;

    let mut request = CrawlRequest::new(channel_id);

    if let Some(value) = payload.get("max_videos") {
        request.max_videos = positive_int(value)
            .ok_or_else(|| ApiError::bad_request("max_videos must be a positive integer"))?;
    }
    if let Some(value) = payload.get("max_comments") {
        request.max_comments = positive_int(value)
            .ok_or_else(|| ApiError::bad_request("max_comments must be a positive integer"))?;
    }

    request.username = match payload.get("username") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(ApiError::bad_request("username must be a string")),
    };

    request.keywords = match payload.get("keywords") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|k| k.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| ApiError::bad_request("keywords must be a list of strings"))?,
        ),
        Some(_) => return Err(ApiError::bad_request("keywords must be a list of strings")),
    };

    Ok(request)
}

fn positive_int(value: &Value) -> Option<usize> {
    value
        .as_u64()
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn swagger_ui() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>YouTube Comment Crawler API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({
                url: "/swagger.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [SwaggerUIBundle.presets.apis]
            });
        };
    </script>
</body>
</html>"#,
    )
}

async fn fallback() -> ApiError {
    ApiError::not_found()
}
