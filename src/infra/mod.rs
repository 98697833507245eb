//! Infrastructure adapters and runtime bootstrap.

use std::sync::Arc;

use crate::application::repos::{
    HealthRepo, ItemsRepo, ItemsWriteRepo, UsersRepo, UsersWriteRepo,
};

pub mod db;
pub mod error;
pub mod http;
pub mod memory;
pub mod telemetry;

/// Repository handles shared by the services, backed by a single adapter.
#[derive(Clone)]
pub struct Repositories {
    pub items: Arc<dyn ItemsRepo>,
    pub items_write: Arc<dyn ItemsWriteRepo>,
    pub users: Arc<dyn UsersRepo>,
    pub users_write: Arc<dyn UsersWriteRepo>,
    pub health: Arc<dyn HealthRepo>,
}

impl Repositories {
    pub fn postgres(repositories: Arc<db::PostgresRepositories>) -> Self {
        Self {
            items: repositories.clone(),
            items_write: repositories.clone(),
            users: repositories.clone(),
            users_write: repositories.clone(),
            health: repositories,
        }
    }

    pub fn in_memory(repositories: Arc<memory::InMemoryRepositories>) -> Self {
        Self {
            items: repositories.clone(),
            items_write: repositories.clone(),
            users: repositories.clone(),
            users_write: repositories.clone(),
            health: repositories,
        }
    }
}
