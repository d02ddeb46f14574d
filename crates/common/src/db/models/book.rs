//! Book entity

use crate::moderation::BookStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub author: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub publisher: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub translator: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub original_language: Option<String>,

    pub published_year: Option<i32>,

    pub page_count: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub cover_url: Option<String>,

    pub category_id: Option<Uuid>,

    /// Moderation gate: PENDING, APPROVED or REJECTED
    #[sea_orm(column_type = "Text")]
    pub status: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,

    pub approved_by: Option<Uuid>,

    pub approved_at: Option<DateTimeWithTimeZone>,

    pub submitted_by: Uuid,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the moderation status as an enum
    pub fn book_status(&self) -> BookStatus {
        BookStatus::from_db(&self.status)
    }

    /// Whether the book passes the public visibility gate
    pub fn is_public(&self) -> bool {
        self.book_status().is_public()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,

    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,

    #[sea_orm(has_many = "super::highlight::Entity")]
    Highlights,

    #[sea_orm(has_many = "super::book_subgenre::Entity")]
    BookSubgenres,

    #[sea_orm(has_many = "super::book_tag::Entity")]
    BookTags,

    #[sea_orm(has_many = "super::shelf::Entity")]
    Shelves,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::highlight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Highlights.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
