//! Book/subgenre junction entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_subgenres")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub book_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub subgenre_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id"
    )]
    Book,

    #[sea_orm(
        belongs_to = "super::subgenre::Entity",
        from = "Column::SubgenreId",
        to = "super::subgenre::Column::Id"
    )]
    Subgenre,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::subgenre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subgenre.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
