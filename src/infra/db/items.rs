use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::pagination::{Page, PageRequest, SortDirection, SortField},
    application::repos::{
        CreateItemParams, ItemsRepo, ItemsWriteRepo, RepoError, UpdateItemParams,
    },
    domain::entities::ItemRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

const ITEM_COLUMNS: &str = "id, name, description, version, created_at";

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    description: String,
    version: i32,
    created_at: OffsetDateTime,
}

impl From<ItemRow> for ItemRecord {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            version: row.version,
            created_at: row.created_at,
        }
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Name => "name",
        SortField::Description => "description",
        SortField::Version => "version",
        SortField::CreatedAt => "created_at",
    }
}

fn push_order_by(qb: &mut QueryBuilder<'_, Postgres>, request: &PageRequest) {
    qb.push(" ORDER BY ");
    if let Some(sort) = request.sort {
        qb.push(sort_column(sort.field));
        qb.push(match sort.direction {
            SortDirection::Asc => " ASC, ",
            SortDirection::Desc => " DESC, ",
        });
    }
    qb.push("seq ASC");
}

#[async_trait]
impl ItemsRepo for PostgresRepositories {
    async fn find_item(&self, id: Uuid) -> Result<Option<ItemRecord>, RepoError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ItemRecord::from))
    }

    async fn list_items(&self, request: &PageRequest) -> Result<Page<ItemRecord>, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let offset = i64::try_from(request.offset()).map_err(|_| RepoError::InvalidInput {
            message: "page offset out of range".to_string(),
        })?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(ITEM_COLUMNS);
        qb.push(" FROM items");
        push_order_by(&mut qb, request);
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(request.size));
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<ItemRow>()
            .fetch_all(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        let total = u64::try_from(total).unwrap_or_default();
        Ok(Page::new(
            rows.into_iter().map(ItemRecord::from).collect(),
            request,
            total,
        ))
    }
}

#[async_trait]
impl ItemsWriteRepo for PostgresRepositories {
    async fn create_item(&self, params: CreateItemParams) -> Result<ItemRecord, RepoError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "INSERT INTO items (id, name, description, version) \
             VALUES ($1, $2, $3, 0) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(params.id)
        .bind(&params.name)
        .bind(&params.description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_item(&self, params: UpdateItemParams) -> Result<ItemRecord, RepoError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE items \
             SET name = $2, description = $3, version = version + 1 \
             WHERE id = $1 AND version = $4 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(params.id)
        .bind(&params.name)
        .bind(&params.description)
        .bind(params.expected_version)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        let stored: Option<i32> = sqlx::query_scalar("SELECT version FROM items WHERE id = $1")
            .bind(params.id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        match stored {
            Some(actual) => Err(RepoError::VersionConflict {
                expected: params.expected_version,
                actual,
            }),
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
