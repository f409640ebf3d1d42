//! HTTP route handlers.

pub mod artworks;
pub mod health;
