//! Registration and login handlers

use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use maktaba_common::{
    auth::{hash_password, verify_password},
    errors::{AppError, Result},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    /// "ar" or "en"; defaults to Arabic
    #[serde(default = "default_language")]
    pub preferred_language: String,
}

fn default_language() -> String {
    "ar".to_string()
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email
    #[validate(length(min = 1))]
    pub identifier: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub preferred_language: String,
}

/// Register a new account and issue a token
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    request.validate()?;

    if request.preferred_language != "ar" && request.preferred_language != "en" {
        return Err(AppError::Validation {
            message: "preferred_language must be \"ar\" or \"en\"".to_string(),
            field: Some("preferred_language".to_string()),
        });
    }

    let password_hash = hash_password(&request.password)?;

    let user = state
        .repo
        .create_user(
            request.username,
            request.email,
            password_hash,
            request.preferred_language,
        )
        .await?;

    let token = state.jwt.generate_token(user.id)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: AuthUser {
                id: user.id,
                username: user.username,
                email: user.email,
                role: user.role,
                preferred_language: user.preferred_language,
            },
        }),
    ))
}

/// Verify credentials and issue a token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    request.validate()?;

    let user = state
        .repo
        .find_user_by_identifier(&request.identifier)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.jwt.generate_token(user.id)?;

    Ok(Json(AuthResponse {
        token,
        user: AuthUser {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            preferred_language: user.preferred_language,
        },
    }))
}
