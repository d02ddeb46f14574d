//! Middleware for the Maktaba API

pub mod rate_limit;
