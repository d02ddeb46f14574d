//! Review/reply aggregation
//!
//! Builds the nested payload for `GET /api/reviews/{bookId}`: non-deleted
//! reviews annotated with like counts and caller like state, each carrying
//! its reply forest reconstructed from `parent_reply_id` back-references.

mod tree;

pub use tree::{build_reply_forests, ReplyNode};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A review row as fetched by the aggregator query, author joined in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRow {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub rating: i16,
    pub comment: Option<String>,
    pub like_count: i64,
    /// -1 anonymous caller, 0 not liked, 1 liked
    pub is_liked: i8,
    pub created_at: DateTime<Utc>,
}

/// A reply row as fetched by the aggregator query, author joined in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRow {
    pub id: Uuid,
    pub review_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub parent_reply_id: Option<Uuid>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A review with its reconstructed reply forest
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithReplies {
    #[serde(flatten)]
    pub review: ReviewRow,
    pub replies: Vec<ReplyNode>,
}

/// Assemble the aggregator response: attach each review's reply forest.
///
/// `reviews` arrive newest-first and `replies` oldest-first, both already
/// filtered to non-deleted rows; both orders are preserved.
pub fn assemble(reviews: Vec<ReviewRow>, replies: Vec<ReplyRow>) -> Vec<ReviewWithReplies> {
    let mut forests = build_reply_forests(replies);

    reviews
        .into_iter()
        .map(|review| {
            let replies = forests.remove(&review.id).unwrap_or_default();
            ReviewWithReplies { review, replies }
        })
        .collect()
}
