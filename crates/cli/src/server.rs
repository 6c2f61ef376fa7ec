//! HTTP API over the orchestrator.
//!
//! Every operation is a JSON `POST`; `GET /health` reports readiness.
//! Errors are returned as `{"error": "..."}` with 400 for invalid input,
//! 503 when the index is not ready and 500 otherwise.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lectern_core::{AppError, AppResult};
use lectern_engine::{
    AnswerRequest, ClassifyRequest, ComprehensiveSearchRequest, MultiAnswerRequest, Orchestrator,
    SearchRequest, SmartSearchRequest, TotWithImagesRequest, TreeOfThoughtsRequest,
};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Error response wrapper mapping [`AppError`] to a status code.
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::validation("body", rejection.body_text()))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if self.0.is_not_ready() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn reply<T: Serialize>(value: AppResult<T>) -> ApiResult<T> {
    value.map(Json).map_err(ApiError::from)
}

pub fn router(orchestrator: Orchestrator) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", post(search))
        .route("/answer", post(answer))
        .route("/answer-multiple", post(answer_multiple))
        .route("/search-and-answer", post(search_and_answer))
        .route("/search-and-answer-multi", post(search_and_answer))
        .route("/comprehensive-search", post(comprehensive_search))
        .route("/classify", post(classify))
        .route("/smart-search", post(smart_search))
        .route("/tree-of-thoughts", post(tree_of_thoughts))
        .route("/tot-with-images", post(tot_with_images))
        .with_state(orchestrator)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(orchestrator: Orchestrator, bind_addr: &str) -> AppResult<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn health(State(orchestrator): State<Orchestrator>) -> impl IntoResponse {
    let report = orchestrator.health();
    let status = if report.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

async fn search(
    State(orchestrator): State<Orchestrator>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let result = orchestrator.search(request).await?;
    Ok(Json(result.as_ref().clone()))
}

async fn answer(
    State(orchestrator): State<Orchestrator>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    reply(orchestrator.answer(request).await)
}

async fn answer_multiple(
    State(orchestrator): State<Orchestrator>,
    payload: Result<Json<MultiAnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    reply(orchestrator.answer_multiple(request).await)
}

async fn search_and_answer(
    State(orchestrator): State<Orchestrator>,
    payload: Result<Json<MultiAnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    reply(orchestrator.search_and_answer(request).await)
}

async fn comprehensive_search(
    State(orchestrator): State<Orchestrator>,
    payload: Result<Json<ComprehensiveSearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    reply(orchestrator.comprehensive_search(request).await)
}

async fn classify(
    State(orchestrator): State<Orchestrator>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    reply(orchestrator.classify(request))
}

async fn smart_search(
    State(orchestrator): State<Orchestrator>,
    payload: Result<Json<SmartSearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    reply(orchestrator.smart_search(request).await)
}

async fn tree_of_thoughts(
    State(orchestrator): State<Orchestrator>,
    payload: Result<Json<TreeOfThoughtsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    reply(orchestrator.tree_of_thoughts(request).await)
}

async fn tot_with_images(
    State(orchestrator): State<Orchestrator>,
    payload: Result<Json<TotWithImagesRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    reply(orchestrator.tot_with_images(request).await)
}
