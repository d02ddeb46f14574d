//! Reading shelf handlers
//!
//! One row per (user, book); setting the status to "none" removes the row.

use crate::extract::CurrentUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use maktaba_common::{
    db::models::ShelfStatus,
    db::repository::ShelfRow,
    errors::{AppError, Result},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SetShelfRequest {
    pub book_id: Uuid,

    /// want_to_read, currently_reading, read, or none
    pub status: String,
}

#[derive(Serialize)]
pub struct SetShelfResponse {
    pub book_id: Uuid,
    /// None when the row was removed
    pub status: Option<ShelfStatus>,
}

#[derive(Serialize)]
pub struct UserShelfResponse {
    pub shelves: Vec<ShelfRow>,
}

/// Upsert the caller's shelf status for a book; "none" removes the row
pub async fn set_shelf(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SetShelfRequest>,
) -> Result<Json<SetShelfResponse>> {
    let action = ShelfStatus::parse_action(&request.status)?;

    let book = state.repo.find_public_book(request.book_id).await?;
    if book.is_none() {
        return Err(AppError::BookNotFound {
            id: request.book_id.to_string(),
        });
    }

    match action {
        Some(status) => {
            state.repo.upsert_shelf(user.id, request.book_id, status).await?;
        }
        None => {
            state.repo.remove_shelf(user.id, request.book_id).await?;
        }
    }

    Ok(Json(SetShelfResponse {
        book_id: request.book_id,
        status: action,
    }))
}

/// A user's shelf, joined with its approved books
pub async fn get_user_shelf(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserShelfResponse>> {
    let shelves = state.repo.shelves_for_user(user_id).await?;

    Ok(Json(UserShelfResponse { shelves }))
}
