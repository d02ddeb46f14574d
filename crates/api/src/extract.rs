//! Request extractors for authentication
//!
//! Tokens carry the user id only; the account row (and with it the admin
//! flag) is re-fetched from the database on every request.

use crate::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use maktaba_common::{
    auth::extract_bearer,
    db::models::User,
    errors::{AppError, Result},
};

/// An authenticated caller; rejects when no valid token is presented
pub struct CurrentUser(pub User);

/// An optionally-authenticated caller; malformed or missing tokens are
/// treated as anonymous, never rejected
pub struct MaybeUser(pub Option<User>);

/// An authenticated admin; rejects non-admin callers with 403
pub struct AdminUser(pub User);

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<User> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Missing Authorization header".to_string(),
        })?;

    let token = extract_bearer(auth_header).ok_or(AppError::InvalidToken)?;

    let claims = state.jwt.validate_token(token)?;
    let user_id = claims.user_id()?;

    state
        .repo
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::InvalidToken)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        resolve_user(parts, state).await.map(CurrentUser)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        Ok(MaybeUser(resolve_user(parts, state).await.ok()))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = resolve_user(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::AdminRequired);
        }
        Ok(AdminUser(user))
    }
}
