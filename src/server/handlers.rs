// file: src/server/handlers.rs
// description: http handlers for retrieval, compression, answering and summarization
// reference: https://docs.rs/axum

use crate::error::{AskemError, Result};
use crate::models::{Document, DocumentQuery};
use crate::pipeline::{Answer, RagPipeline};
use crate::utils::{HealthReport, HealthStatus};
use axum::Json;
use axum::extract::{FromRequest, Request, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub type AppState = Arc<RagPipeline>;

/// JSON body extractor whose rejections render as `{"detail": ...}`.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AskemError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[derive(Debug, Deserialize)]
pub struct CompressRequest {
    pub chunks: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompressResponse {
    pub compressed: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(flatten)]
    pub query: DocumentQuery,
    #[serde(default)]
    pub compress: bool,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub sentences: Vec<String>,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingsRequest {
    pub sentences: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddingsResponse {
    pub embeddings: Vec<Vec<f32>>,
}

/// GET /health - 503 when a required upstream is down
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health().await;
    let status = if report.overall_status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(report))
}

/// POST /documents
pub async fn documents(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<DocumentQuery>,
) -> Result<Json<Vec<Document>>> {
    info!("POST /documents: {}", query.question);
    Ok(Json(state.search(&query).await?))
}

/// POST /compress
pub async fn compress(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CompressRequest>,
) -> Result<Json<CompressResponse>> {
    let compressed = state.compress(&request.chunks).await?;
    Ok(Json(CompressResponse { compressed }))
}

/// POST /answer
pub async fn answer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnswerRequest>,
) -> Result<Json<Answer>> {
    info!("POST /answer: {}", request.query.question);
    Ok(Json(state.answer(&request.query, request.compress).await?))
}

/// POST /summarize
pub async fn summarize(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>> {
    let summary = state
        .summarize(&request.sentences, request.question.as_deref())
        .await?;
    Ok(Json(SummarizeResponse { summary }))
}

/// POST /embeddings
pub async fn embeddings(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EmbeddingsRequest>,
) -> Result<Json<EmbeddingsResponse>> {
    let embeddings = state.embed(&request.sentences).await?;
    Ok(Json(EmbeddingsResponse { embeddings }))
}
