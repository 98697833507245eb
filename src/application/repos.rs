//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::domain::entities::{ItemRecord, UserRecord};
use crate::domain::types::Authority;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("stale version: expected {expected}, stored {actual}")]
    VersionConflict { expected: i32, actual: i32 },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateItemParams {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Replacement content for an item. The write only succeeds while the stored version
/// still equals `expected_version`; the stored version is then incremented by one.
#[derive(Debug, Clone)]
pub struct UpdateItemParams {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub expected_version: i32,
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub enabled: bool,
    pub locked: bool,
    pub authorities: Vec<Authority>,
}

#[async_trait]
pub trait ItemsRepo: Send + Sync {
    async fn find_item(&self, id: Uuid) -> Result<Option<ItemRecord>, RepoError>;

    /// Without a sort the page follows insertion order.
    async fn list_items(&self, request: &PageRequest) -> Result<Page<ItemRecord>, RepoError>;
}

#[async_trait]
pub trait ItemsWriteRepo: Send + Sync {
    /// Persists a new item at version 0.
    async fn create_item(&self, params: CreateItemParams) -> Result<ItemRecord, RepoError>;

    async fn update_item(&self, params: UpdateItemParams) -> Result<ItemRecord, RepoError>;

    async fn delete_item(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;
}

#[async_trait]
pub trait UsersWriteRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn health_check(&self) -> Result<(), RepoError>;
}
