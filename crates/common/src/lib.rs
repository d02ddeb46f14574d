//! Maktaba Common Library
//!
//! Shared code for the Maktaba services including:
//! - Database entities and repository pattern
//! - Review/reply aggregation
//! - Moderation state logic
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Arabic-aware text normalization
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod moderation;
pub mod reviews;
pub mod text;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sentinel value for `is_liked` when the caller is anonymous
pub const IS_LIKED_ANONYMOUS: i8 = -1;
