//! Reading shelf entity
//!
//! One row per (user, book). Setting the status to "none" removes the row
//! instead of storing it.

use crate::errors::AppError;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reading status stored on a shelf row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelfStatus {
    WantToRead,
    CurrentlyReading,
    Read,
}

impl ShelfStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShelfStatus::WantToRead => "want_to_read",
            ShelfStatus::CurrentlyReading => "currently_reading",
            ShelfStatus::Read => "read",
        }
    }

    /// Parse a shelf request value. `Ok(None)` means "remove the row".
    pub fn parse_action(value: &str) -> crate::errors::Result<Option<Self>> {
        match value {
            "want_to_read" => Ok(Some(ShelfStatus::WantToRead)),
            "currently_reading" => Ok(Some(ShelfStatus::CurrentlyReading)),
            "read" => Ok(Some(ShelfStatus::Read)),
            "none" => Ok(None),
            other => Err(AppError::Validation {
                message: format!("Unknown shelf status: {}", other),
                field: Some("status".to_string()),
            }),
        }
    }
}

impl From<String> for ShelfStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "currently_reading" => ShelfStatus::CurrentlyReading,
            "read" => ShelfStatus::Read,
            _ => ShelfStatus::WantToRead,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shelves")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub book_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn shelf_status(&self) -> ShelfStatus {
        ShelfStatus::from(self.status.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id"
    )]
    Book,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        assert_eq!(
            ShelfStatus::parse_action("want_to_read").unwrap(),
            Some(ShelfStatus::WantToRead)
        );
        assert_eq!(ShelfStatus::parse_action("none").unwrap(), None);
        assert!(ShelfStatus::parse_action("WantToRead").is_err());
        assert!(ShelfStatus::parse_action("").is_err());
    }
}
