use std::sync::Arc;

use thiserror::Error;

use crate::application::repos::{RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct UserService {
    reader: Arc<dyn UsersRepo>,
}

impl UserService {
    pub fn new(reader: Arc<dyn UsersRepo>) -> Self {
        Self { reader }
    }

    /// Looks a user up by email, authorities included. Emails compare case-insensitively.
    pub async fn load_by_email(&self, email: &str) -> Result<UserRecord, UserError> {
        let normalized = email.trim().to_ascii_lowercase();
        self.reader
            .find_user_by_email(&normalized)
            .await?
            .ok_or(UserError::NotFound(normalized))
    }
}
