//! Review, reply, and like handlers
//!
//! `get_reviews` is the aggregator surface: reviews newest-first, each
//! carrying its like annotations and nested reply forest.

use crate::extract::{CurrentUser, MaybeUser};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use maktaba_common::{
    db::models::{Review, ReviewReply},
    errors::{AppError, Result},
    metrics, reviews,
    reviews::ReviewWithReplies,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub book_id: Uuid,

    #[validate(range(min = 1, max = 5))]
    pub rating: i16,

    #[validate(length(max = 10000))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,

    #[validate(length(max = 10000))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReplyRequest {
    #[validate(length(min = 1, max = 5000))]
    pub comment: String,

    pub parent_reply_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

#[derive(Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewWithReplies>,
}

/// Aggregated reviews for a book. Anonymous callers get `is_liked = -1`;
/// unknown book ids produce an empty list, not an error.
pub async fn get_reviews(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(book_id): Path<Uuid>,
) -> Result<Json<ReviewsResponse>> {
    let viewer_id = viewer.map(|u| u.id);

    let review_rows = state.repo.reviews_for_book(book_id, viewer_id).await?;
    let reply_rows = state.repo.replies_for_book(book_id).await?;

    Ok(Json(ReviewsResponse {
        reviews: reviews::assemble(review_rows, reply_rows),
    }))
}

/// Create a review; one non-deleted review per (user, book)
pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    request.validate()?;

    // Reviews target publicly visible books only
    let book = state.repo.find_public_book(request.book_id).await?;
    if book.is_none() {
        return Err(AppError::BookNotFound {
            id: request.book_id.to_string(),
        });
    }

    let review = state
        .repo
        .create_review(request.book_id, user.id, request.rating, request.comment)
        .await?;

    metrics::record_review_created();
    tracing::info!(review_id = %review.id, book_id = %review.book_id, "Review created");

    Ok((StatusCode::CREATED, Json(review)))
}

/// Update a review's rating and comment (owner only)
pub async fn update_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(review_id): Path<Uuid>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<Review>> {
    request.validate()?;

    let review = state
        .repo
        .find_review_by_id(review_id)
        .await?
        .ok_or_else(|| AppError::ReviewNotFound {
            id: review_id.to_string(),
        })?;

    if review.user_id != user.id {
        return Err(AppError::NotOwner);
    }

    let review = state
        .repo
        .update_review(review_id, request.rating, request.comment)
        .await?;

    Ok(Json(review))
}

/// Soft-delete a review (owner or admin)
pub async fn delete_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(review_id): Path<Uuid>,
) -> Result<Json<Review>> {
    let review = state
        .repo
        .find_review_by_id(review_id)
        .await?
        .ok_or_else(|| AppError::ReviewNotFound {
            id: review_id.to_string(),
        })?;

    if review.user_id != user.id && !user.is_admin() {
        return Err(AppError::NotOwner);
    }

    let review = state.repo.soft_delete_review(review_id).await?;

    tracing::info!(review_id = %review_id, by = %user.id, "Review soft-deleted");

    Ok(Json(review))
}

/// Toggle the caller's like on a review
pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(review_id): Path<Uuid>,
) -> Result<Json<LikeResponse>> {
    let (liked, like_count) = state.repo.toggle_review_like(review_id, user.id).await?;

    metrics::record_like_toggled("review");

    Ok(Json(LikeResponse { liked, like_count }))
}

/// Reply to a review, optionally nested under another reply
pub async fn create_reply(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(review_id): Path<Uuid>,
    Json(request): Json<CreateReplyRequest>,
) -> Result<(StatusCode, Json<ReviewReply>)> {
    request.validate()?;

    let reply = state
        .repo
        .create_reply(review_id, user.id, request.parent_reply_id, request.comment)
        .await?;

    Ok((StatusCode::CREATED, Json(reply)))
}

/// Soft-delete a reply (owner or admin)
pub async fn delete_reply(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(reply_id): Path<Uuid>,
) -> Result<Json<ReviewReply>> {
    let reply = state
        .repo
        .find_reply_by_id(reply_id)
        .await?
        .ok_or_else(|| AppError::ReplyNotFound {
            id: reply_id.to_string(),
        })?;

    if reply.user_id != user.id && !user.is_admin() {
        return Err(AppError::NotOwner);
    }

    let reply = state.repo.soft_delete_reply(reply_id).await?;

    Ok(Json(reply))
}
