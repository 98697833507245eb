//! Bearer-token authentication for the item routes.
//!
//! Tokens are HS256 JWTs minted by an external authorization server that shares the
//! signing key with this service. The token names the user and the authorities it was
//! granted; the user record decides whether the account may still act.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::application::users::{UserError, UserService};
use crate::domain::types::Authority;

/// Authorities allowed to use the item routes.
pub const ITEM_AUTHORITIES: [Authority; 3] =
    [Authority::User, Authority::UserManager, Authority::Admin];

/// Claims issued by the authorization server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub user_name: String,
    #[serde(default)]
    pub authorities: Vec<String>,
    pub exp: u64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("unknown user `{0}`")]
    UnknownUser(String),
    #[error("account `{0}` is disabled")]
    AccountDisabled(String),
    #[error("account `{0}` is locked")]
    AccountLocked(String),
    #[error("insufficient authority")]
    Forbidden,
    #[error("user lookup failed: {0}")]
    Lookup(UserError),
}

/// The authenticated user attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub authorities: Vec<Authority>,
}

impl Principal {
    pub fn has_any(&self, required: &[Authority]) -> bool {
        required
            .iter()
            .any(|authority| self.authorities.contains(authority))
    }

    pub fn require_any(&self, required: &[Authority]) -> Result<(), AuthError> {
        if self.has_any(required) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<UserService>,
    key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(users: Arc<UserService>, signing_key: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            users,
            key: DecodingKey::from_secret(signing_key.as_bytes()),
            validation,
        }
    }

    /// Verifies signature and expiry, then checks the named account is still usable.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &self.key, &self.validation)?;
        let claims = data.claims;

        let user = self
            .users
            .load_by_email(&claims.user_name)
            .await
            .map_err(|err| match err {
                UserError::NotFound(email) => AuthError::UnknownUser(email),
                other => AuthError::Lookup(other),
            })?;

        if !user.enabled {
            return Err(AuthError::AccountDisabled(user.email));
        }
        if user.locked {
            return Err(AuthError::AccountLocked(user.email));
        }

        let authorities = claims
            .authorities
            .iter()
            .filter_map(|name| match name.parse::<Authority>() {
                Ok(authority) => Some(authority),
                Err(err) => {
                    debug!(target = "application::auth", %err, "ignoring token authority");
                    None
                }
            })
            .collect();

        Ok(Principal {
            user_id: user.id,
            email: user.email,
            authorities,
        })
    }
}
