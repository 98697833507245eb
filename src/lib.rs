//! Primer: a versioned item catalogue served over a cached, conditional HTTP API.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
