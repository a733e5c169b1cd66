//! Image listing endpoint

use axum::extract::State;
use serde::Serialize;
use tracing::debug;

use crate::api::middleware::RequireApiKey;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::ImageEntry;

#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub images: Vec<ImageEntry>,
    pub count: usize,
}

/// GET /api/images
pub async fn list_images(
    State(state): State<AppState>,
    RequireApiKey { label }: RequireApiKey,
) -> Result<Json<ImageListResponse>, ApiError> {
    let images = state.images.list().await?;

    debug!(key_label = %label, count = images.len(), "Listed images");

    Ok(Json(ImageListResponse {
        count: images.len(),
        images: images.to_vec(),
    }))
}
