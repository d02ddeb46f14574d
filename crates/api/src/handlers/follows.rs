//! Follow graph handlers

use crate::extract::CurrentUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use maktaba_common::{
    db::models::Follow,
    db::repository::UserSummary,
    errors::{AppError, Result},
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
}

/// Follow a user; self-follows are rejected, duplicates conflict
pub async fn follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(target_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Follow>)> {
    let edge = state.repo.follow(user.id, target_id).await?;

    tracing::info!(follower = %user.id, following = %target_id, "Follow created");

    Ok((StatusCode::CREATED, Json(edge)))
}

/// Remove a follow edge; 404 when none exists
pub async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(target_id): Path<Uuid>,
) -> Result<StatusCode> {
    let removed = state.repo.unfollow(user.id, target_id).await?;
    if !removed {
        // The edge is what is missing; the target user may well exist
        return Err(AppError::NotFound {
            resource_type: "follow".to_string(),
            id: target_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_followers(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UsersResponse>> {
    ensure_user_exists(&state, user_id).await?;
    let users = state.repo.followers_of(user_id).await?;

    Ok(Json(UsersResponse { users }))
}

pub async fn list_following(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UsersResponse>> {
    ensure_user_exists(&state, user_id).await?;
    let users = state.repo.following_of(user_id).await?;

    Ok(Json(UsersResponse { users }))
}

async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> Result<()> {
    if state.repo.find_user_by_id(user_id).await?.is_none() {
        return Err(AppError::UserNotFound {
            id: user_id.to_string(),
        });
    }
    Ok(())
}
