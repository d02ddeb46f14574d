//! API handlers module

pub mod admin;
pub mod auth;
pub mod books;
pub mod follows;
pub mod health;
pub mod highlights;
pub mod reviews;
pub mod search;
pub mod shelves;
pub mod users;
