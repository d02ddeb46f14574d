//! Highlight handlers

use crate::extract::{CurrentUser, MaybeUser};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use maktaba_common::{
    db::models::Highlight,
    db::repository::HighlightRow,
    errors::{AppError, Result},
    metrics,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHighlightRequest {
    pub book_id: Uuid,

    #[validate(length(min = 1, max = 5000))]
    pub text_content: Option<String>,

    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct HighlightsResponse {
    pub highlights: Vec<HighlightRow>,
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

/// Create a highlight; a text excerpt, an image, or both
pub async fn create_highlight(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateHighlightRequest>,
) -> Result<(StatusCode, Json<Highlight>)> {
    request.validate()?;

    if request.text_content.is_none() && request.image_url.is_none() {
        return Err(AppError::MissingField {
            field: "text_content or image_url".to_string(),
        });
    }

    let book = state.repo.find_public_book(request.book_id).await?;
    if book.is_none() {
        return Err(AppError::BookNotFound {
            id: request.book_id.to_string(),
        });
    }

    let highlight = state
        .repo
        .create_highlight(
            request.book_id,
            user.id,
            request.text_content,
            request.image_url,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(highlight)))
}

/// Like-annotated highlights for a book, newest first
pub async fn get_highlights(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(book_id): Path<Uuid>,
) -> Result<Json<HighlightsResponse>> {
    let viewer_id = viewer.map(|u| u.id);

    let highlights = state.repo.highlights_for_book(book_id, viewer_id).await?;

    Ok(Json(HighlightsResponse { highlights }))
}

/// Toggle the caller's like on a highlight
pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(highlight_id): Path<Uuid>,
) -> Result<Json<LikeResponse>> {
    let (liked, like_count) = state
        .repo
        .toggle_highlight_like(highlight_id, user.id)
        .await?;

    metrics::record_like_toggled("highlight");

    Ok(Json(LikeResponse { liked, like_count }))
}
