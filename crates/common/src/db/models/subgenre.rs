//! Subgenre lookup entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subgenres")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub name_ar: String,

    #[sea_orm(column_type = "Text")]
    pub name_en: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book_subgenre::Entity")]
    BookSubgenres,
}

impl Related<super::book_subgenre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookSubgenres.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
