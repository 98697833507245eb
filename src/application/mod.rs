//! Application services orchestrating domain logic.

pub mod auth;
pub mod error;
pub mod fingerprint;
pub mod items;
pub mod pagination;
pub mod repos;
pub mod seed;
pub mod users;
