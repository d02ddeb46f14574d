//! Moderation gate logic
//!
//! Books are created `PENDING` and become publicly visible only once an
//! admin approves them. The decision endpoint accepts APPROVED or REJECTED;
//! any other value is a validation failure. Approval stamps the audit
//! fields, rejection stores the reason and nulls them.

use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Book visibility status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    Pending,
    Approved,
    Rejected,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Pending => "PENDING",
            BookStatus::Approved => "APPROVED",
            BookStatus::Rejected => "REJECTED",
        }
    }

    /// Parse a stored status column; unknown values fall back to PENDING
    pub fn from_db(s: &str) -> Self {
        match s {
            "APPROVED" => BookStatus::Approved,
            "REJECTED" => BookStatus::Rejected,
            _ => BookStatus::Pending,
        }
    }

    /// Only approved books pass the public gate
    pub fn is_public(&self) -> bool {
        matches!(self, BookStatus::Approved)
    }
}

impl From<String> for BookStatus {
    fn from(s: String) -> Self {
        BookStatus::from_db(&s)
    }
}

impl From<BookStatus> for String {
    fn from(status: BookStatus) -> Self {
        status.as_str().to_string()
    }
}

/// An admin's review decision. Unlike `BookStatus`, PENDING is not a
/// settable decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModerationDecision {
    Approve,
    Reject,
}

impl ModerationDecision {
    /// Parse the decision from a request payload value
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "APPROVED" => Ok(ModerationDecision::Approve),
            "REJECTED" => Ok(ModerationDecision::Reject),
            other => Err(AppError::InvalidDecision {
                value: other.to_string(),
            }),
        }
    }
}

/// The column values a moderation decision writes to the book row
#[derive(Clone, Debug, PartialEq)]
pub struct ModerationStamp {
    pub status: BookStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl ModerationStamp {
    /// Compute the row update for a decision made by `admin_id` at `now`
    pub fn apply(
        decision: ModerationDecision,
        admin_id: Uuid,
        rejection_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        match decision {
            ModerationDecision::Approve => ModerationStamp {
                status: BookStatus::Approved,
                approved_by: Some(admin_id),
                approved_at: Some(now),
                rejection_reason: None,
            },
            ModerationDecision::Reject => ModerationStamp {
                status: BookStatus::Rejected,
                approved_by: None,
                approved_at: None,
                rejection_reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(BookStatus::from_db("APPROVED"), BookStatus::Approved);
        assert_eq!(BookStatus::from_db("REJECTED"), BookStatus::Rejected);
        assert_eq!(BookStatus::from_db("garbage"), BookStatus::Pending);
        assert_eq!(BookStatus::Approved.as_str(), "APPROVED");
    }

    #[test]
    fn test_only_approved_is_public() {
        assert!(BookStatus::Approved.is_public());
        assert!(!BookStatus::Pending.is_public());
        assert!(!BookStatus::Rejected.is_public());
    }

    #[test]
    fn test_decision_parse() {
        assert_eq!(
            ModerationDecision::parse("APPROVED").unwrap(),
            ModerationDecision::Approve
        );
        assert_eq!(
            ModerationDecision::parse("REJECTED").unwrap(),
            ModerationDecision::Reject
        );
        assert!(ModerationDecision::parse("PENDING").is_err());
        assert!(ModerationDecision::parse("approved").is_err());
    }

    #[test]
    fn test_approve_stamps_audit_fields() {
        let admin = Uuid::new_v4();
        let now = Utc::now();
        let stamp = ModerationStamp::apply(
            ModerationDecision::Approve,
            admin,
            Some("ignored".into()),
            now,
        );

        assert_eq!(stamp.status, BookStatus::Approved);
        assert_eq!(stamp.approved_by, Some(admin));
        assert_eq!(stamp.approved_at, Some(now));
        assert_eq!(stamp.rejection_reason, None);
    }

    #[test]
    fn test_reject_nulls_approval_fields() {
        let admin = Uuid::new_v4();
        let now = Utc::now();
        let stamp = ModerationStamp::apply(
            ModerationDecision::Reject,
            admin,
            Some("duplicate entry".into()),
            now,
        );

        assert_eq!(stamp.status, BookStatus::Rejected);
        assert_eq!(stamp.approved_by, None);
        assert_eq!(stamp.approved_at, None);
        assert_eq!(stamp.rejection_reason.as_deref(), Some("duplicate entry"));
    }
}
