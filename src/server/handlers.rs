use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::models::ApiResponse;
use crate::router::{read_multipart, UploadForm};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
}

pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    let Json(payload) =
        payload.map_err(|e| Error::InvalidRequest(format!("Expected JSON body: {}", e.body_text())))?;
    let result = state.router.chat(&payload.prompt).await?;
    Ok(Json(result.into()))
}

pub async fn document(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>> {
    let form = read_form(&state, multipart).await?;
    Ok(Json(state.router.document(form).await?.into()))
}

pub async fn image(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>> {
    let form = read_form(&state, multipart).await?;
    Ok(Json(state.router.image(form).await?.into()))
}

pub async fn audio(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>> {
    let form = read_form(&state, multipart).await?;
    Ok(Json(state.router.audio(form).await?.into()))
}

/// Classifies the attachment (if any) and takes the matching path.
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>> {
    let form = read_form(&state, multipart).await?;
    Ok(Json(state.router.dispatch(form).await?.into()))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.router.model_id().to_string(),
    })
}

async fn read_form(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<UploadForm> {
    let multipart = multipart.map_err(|e| {
        Error::InvalidRequest(format!("Expected multipart/form-data: {}", e.body_text()))
    })?;
    read_multipart(multipart, state.router.max_upload_bytes()).await
}
