//! Admin moderation handlers

use crate::extract::AdminUser;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use maktaba_common::{
    db::models::Book,
    errors::Result,
    metrics,
    moderation::{BookStatus, ModerationDecision, ModerationStamp},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    /// PENDING, APPROVED, or REJECTED; defaults to PENDING
    pub status: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Serialize)]
pub struct QueueResponse {
    pub books: Vec<Book>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewBookRequest {
    /// APPROVED or REJECTED
    pub status: String,

    #[validate(length(max = 2000))]
    pub rejection_reason: Option<String>,
}

/// Moderation queue, any status, newest first
pub async fn list_books(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<QueueQuery>,
) -> Result<Json<QueueResponse>> {
    let status = match query.status.as_deref() {
        Some(s) => BookStatus::from_db(s),
        None => BookStatus::Pending,
    };
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let (books, total) = state.repo.list_books_by_status(status, limit, offset).await?;

    Ok(Json(QueueResponse {
        books,
        total,
        limit,
        offset,
    }))
}

/// Decide a pending book: approve stamps the audit fields, reject
/// stores the reason and nulls them
pub async fn review_book(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(book_id): Path<Uuid>,
    Json(request): Json<ReviewBookRequest>,
) -> Result<Json<Book>> {
    request.validate()?;

    let decision = ModerationDecision::parse(&request.status)?;
    let stamp = ModerationStamp::apply(
        decision,
        admin.id,
        request.rejection_reason,
        chrono::Utc::now(),
    );

    let label = stamp.status.as_str();
    let book = state.repo.apply_moderation(book_id, stamp).await?;

    metrics::record_moderation_decision(match decision {
        ModerationDecision::Approve => "approved",
        ModerationDecision::Reject => "rejected",
    });
    tracing::info!(book_id = %book_id, admin_id = %admin.id, decision = label, "Moderation decision");

    Ok(Json(book))
}
