//! User profile handlers

use crate::extract::MaybeUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use maktaba_common::errors::{AppError, Result};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub preferred_language: String,
    pub followers: u64,
    pub following: u64,
    /// Whether the caller follows this user; absent for anonymous callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
    pub created_at: String,
}

/// Public profile with follow-graph counts
pub async fn get_profile(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>> {
    let user = state
        .repo
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound {
            id: user_id.to_string(),
        })?;

    let (followers, following) = state.repo.follow_counts(user_id).await?;

    let is_following = match viewer {
        Some(viewer) if viewer.id != user_id => {
            Some(state.repo.is_following(viewer.id, user_id).await?)
        }
        _ => None,
    };

    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        bio: user.bio,
        avatar_url: user.avatar_url,
        preferred_language: user.preferred_language,
        followers,
        following,
        is_following,
        created_at: user.created_at.to_rfc3339(),
    }))
}
