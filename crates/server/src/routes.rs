//! Request handlers.

use crate::auth::TokenResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Multipart, Query, Request, State,
    },
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Form, Json,
};
use docqa_knowledge::DocumentRecord;
use serde::{Deserialize, Serialize};

/// Multipart field carrying the uploaded document.
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AskParams {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    pub chunks: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub documents: Vec<DocumentRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn issue_token(
    State(state): State<AppState>,
    form: Result<Form<TokenForm>, FormRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Form(form) = form?;
    let token = state.tokens.login(&form.username, &form.password)?;
    tracing::info!("Issued token for '{}'", form.username);
    Ok(Json(token))
}

pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        let report = state.service.ingest_bytes(&filename, bytes.to_vec()).await?;
        tracing::info!(file = %filename, chunks = report.chunks, "Document ingested");

        return Ok(Json(UploadResponse {
            status: "ingested".to_string(),
            chunks: report.chunks,
        }));
    }

    Err(ApiError::bad_request(format!(
        "Missing '{}' field in upload",
        UPLOAD_FIELD
    )))
}

pub async fn ask(
    State(state): State<AppState>,
    params: Result<Query<AskParams>, QueryRejection>,
) -> ApiResult<Json<AskResponse>> {
    let Query(params) = params?;
    tracing::info!(question = %params.question, "Question received");
    let answer = state.service.ask(&params.question).await?;
    Ok(Json(AskResponse { answer }))
}

pub async fn list_documents(State(state): State<AppState>) -> ApiResult<Json<DocumentsResponse>> {
    let documents = state.service.documents().await?;
    Ok(Json(DocumentsResponse { documents }))
}

/// Reject requests without a valid bearer token when authentication is required.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if state.auth_required {
        let token = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        let claims = state.tokens.verify(token)?;
        tracing::debug!("Authenticated request for '{}'", claims.sub);
    }

    Ok(next.run(request).await)
}
