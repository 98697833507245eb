use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::{
    application::repos::{CreateUserParams, RepoError, UsersRepo, UsersWriteRepo},
    domain::{entities::UserRecord, types::Authority},
};

use super::{PostgresRepositories, map_sqlx_error};

const USER_WITH_AUTHORITIES: &str = "\
    SELECT u.user_id, u.email, u.first_name, u.last_name, u.enabled, u.locked, \
           COALESCE(array_agg(a.name ORDER BY a.name) FILTER (WHERE a.name IS NOT NULL), '{}') \
               AS authorities \
    FROM users u \
    LEFT JOIN user_authorities ua ON ua.user_id = u.user_id \
    LEFT JOIN authorities a ON a.authority_id = ua.authority_id \
    WHERE u.email = $1 \
    GROUP BY u.user_id";

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    enabled: bool,
    locked: bool,
    authorities: Vec<String>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        let authorities = row
            .authorities
            .iter()
            .filter_map(|name| match name.parse::<Authority>() {
                Ok(authority) => Some(authority),
                Err(err) => {
                    warn!(
                        target = "infra::db::users",
                        user_id = %row.user_id,
                        %err,
                        "skipping unknown stored authority"
                    );
                    None
                }
            })
            .collect();

        Self {
            id: row.user_id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            enabled: row.enabled,
            locked: row.locked,
            authorities,
        }
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(USER_WITH_AUTHORITIES)
            .bind(email.to_ascii_lowercase())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }
}

#[async_trait]
impl UsersWriteRepo for PostgresRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let email = params.email.trim().to_ascii_lowercase();
        let authority_names: Vec<String> = params
            .authorities
            .iter()
            .map(|authority| authority.as_str().to_string())
            .collect();

        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let user_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (user_id, email, first_name, last_name, enabled, locked) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user_id)
        .bind(&email)
        .bind(&params.first_name)
        .bind(&params.last_name)
        .bind(params.enabled)
        .bind(params.locked)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            "INSERT INTO user_authorities (user_id, authority_id) \
             SELECT $1, authority_id FROM authorities WHERE name = ANY($2)",
        )
        .bind(user_id)
        .bind(&authority_names)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, UserRow>(USER_WITH_AUTHORITIES)
            .bind(&email)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
