//! SeaORM entity models
//!
//! Database entities for Maktaba

mod book;
mod book_subgenre;
mod book_tag;
mod category;
mod follow;
mod highlight;
mod highlight_like;
mod review;
mod review_like;
mod review_reply;
mod shelf;
mod subgenre;
mod tag;
mod user;

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
    UserRole,
};

pub use book::{
    Entity as BookEntity,
    Model as Book,
    ActiveModel as BookActiveModel,
    Column as BookColumn,
};

pub use category::{
    Entity as CategoryEntity,
    Model as Category,
    ActiveModel as CategoryActiveModel,
    Column as CategoryColumn,
};

pub use subgenre::{
    Entity as SubgenreEntity,
    Model as Subgenre,
    ActiveModel as SubgenreActiveModel,
    Column as SubgenreColumn,
};

pub use tag::{
    Entity as TagEntity,
    Model as Tag,
    ActiveModel as TagActiveModel,
    Column as TagColumn,
};

pub use book_subgenre::{
    Entity as BookSubgenreEntity,
    Model as BookSubgenre,
    ActiveModel as BookSubgenreActiveModel,
    Column as BookSubgenreColumn,
};

pub use book_tag::{
    Entity as BookTagEntity,
    Model as BookTag,
    ActiveModel as BookTagActiveModel,
    Column as BookTagColumn,
};

pub use review::{
    Entity as ReviewEntity,
    Model as Review,
    ActiveModel as ReviewActiveModel,
    Column as ReviewColumn,
};

pub use review_reply::{
    Entity as ReviewReplyEntity,
    Model as ReviewReply,
    ActiveModel as ReviewReplyActiveModel,
    Column as ReviewReplyColumn,
};

pub use review_like::{
    Entity as ReviewLikeEntity,
    Model as ReviewLike,
    ActiveModel as ReviewLikeActiveModel,
    Column as ReviewLikeColumn,
};

pub use highlight::{
    Entity as HighlightEntity,
    Model as Highlight,
    ActiveModel as HighlightActiveModel,
    Column as HighlightColumn,
};

pub use highlight_like::{
    Entity as HighlightLikeEntity,
    Model as HighlightLike,
    ActiveModel as HighlightLikeActiveModel,
    Column as HighlightLikeColumn,
};

pub use shelf::{
    Entity as ShelfEntity,
    Model as Shelf,
    ActiveModel as ShelfActiveModel,
    Column as ShelfColumn,
    ShelfStatus,
};

pub use follow::{
    Entity as FollowEntity,
    Model as Follow,
    ActiveModel as FollowActiveModel,
    Column as FollowColumn,
};
