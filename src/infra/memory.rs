//! In-memory repository implementations.
//!
//! Used when no database URL is configured and by the test suites. State is lost on restart
//! and is not shared between processes. Items are kept in insertion order, which is the
//! default page order; sorted pages use a stable sort so ties keep insertion order, matching
//! the Postgres adapter.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest, Sort, SortDirection, SortField};
use crate::application::repos::{
    CreateItemParams, CreateUserParams, HealthRepo, ItemsRepo, ItemsWriteRepo, RepoError,
    UpdateItemParams, UsersRepo, UsersWriteRepo,
};
use crate::domain::entities::{ItemRecord, UserRecord};

#[derive(Default)]
pub struct InMemoryRepositories {
    items: RwLock<Vec<ItemRecord>>,
    /// Keyed by lowercase email.
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare(left: &ItemRecord, right: &ItemRecord, sort: Sort) -> Ordering {
    let ordering = match sort.field {
        SortField::Name => left.name.cmp(&right.name),
        SortField::Description => left.description.cmp(&right.description),
        SortField::Version => left.version.cmp(&right.version),
        SortField::CreatedAt => left.created_at.cmp(&right.created_at),
    };
    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl ItemsRepo for InMemoryRepositories {
    async fn find_item(&self, id: Uuid) -> Result<Option<ItemRecord>, RepoError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn list_items(&self, request: &PageRequest) -> Result<Page<ItemRecord>, RepoError> {
        let items = self.items.read().await;
        let total = items.len() as u64;

        let mut ordered: Vec<&ItemRecord> = items.iter().collect();
        if let Some(sort) = request.sort {
            ordered.sort_by(|left, right| compare(left, right, sort));
        }

        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let slice = ordered
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .cloned()
            .collect();

        Ok(Page::new(slice, request, total))
    }
}

#[async_trait]
impl ItemsWriteRepo for InMemoryRepositories {
    async fn create_item(&self, params: CreateItemParams) -> Result<ItemRecord, RepoError> {
        let mut items = self.items.write().await;
        if items.iter().any(|item| item.id == params.id) {
            return Err(RepoError::Duplicate {
                constraint: "items_pkey".to_string(),
            });
        }

        let record = ItemRecord {
            id: params.id,
            name: params.name,
            description: params.description,
            version: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        items.push(record.clone());
        Ok(record)
    }

    async fn update_item(&self, params: UpdateItemParams) -> Result<ItemRecord, RepoError> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| item.id == params.id)
            .ok_or(RepoError::NotFound)?;

        if item.version != params.expected_version {
            return Err(RepoError::VersionConflict {
                expected: params.expected_version,
                actual: item.version,
            });
        }

        item.name = params.name;
        item.description = params.description;
        item.version += 1;
        Ok(item.clone())
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), RepoError> {
        let mut items = self.items.write().await;
        let position = items
            .iter()
            .position(|item| item.id == id)
            .ok_or(RepoError::NotFound)?;
        items.remove(position);
        Ok(())
    }
}

#[async_trait]
impl UsersRepo for InMemoryRepositories {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let users = self.users.read().await;
        Ok(users.get(&email.to_ascii_lowercase()).cloned())
    }
}

#[async_trait]
impl UsersWriteRepo for InMemoryRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let email = params.email.trim().to_ascii_lowercase();
        let mut users = self.users.write().await;
        if users.contains_key(&email) {
            return Err(RepoError::Duplicate {
                constraint: "users_email_key".to_string(),
            });
        }

        let mut authorities = Vec::with_capacity(params.authorities.len());
        for authority in params.authorities {
            if !authorities.contains(&authority) {
                authorities.push(authority);
            }
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            email: email.clone(),
            first_name: params.first_name,
            last_name: params.last_name,
            enabled: params.enabled,
            locked: params.locked,
            authorities,
        };
        users.insert(email, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl HealthRepo for InMemoryRepositories {
    async fn health_check(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(names: &[&str]) -> (InMemoryRepositories, Vec<ItemRecord>) {
        let repos = InMemoryRepositories::new();
        let mut created = Vec::new();
        for name in names {
            created.push(
                repos
                    .create_item(CreateItemParams {
                        id: Uuid::new_v4(),
                        name: name.to_string(),
                        description: format!("{name} description"),
                    })
                    .await
                    .unwrap(),
            );
        }
        (repos, created)
    }

    #[tokio::test]
    async fn pages_follow_insertion_order() {
        let (repos, created) = seeded(&["c", "a", "b"]).await;

        let page = repos
            .list_items(&PageRequest::new(0, 2, None))
            .await
            .unwrap();
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items, created[..2].to_vec());

        let last = repos
            .list_items(&PageRequest::new(1, 2, None))
            .await
            .unwrap();
        assert_eq!(last.items, created[2..].to_vec());

        let beyond = repos
            .list_items(&PageRequest::new(5, 2, None))
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
    }

    #[tokio::test]
    async fn sorted_pages() {
        let (repos, _) = seeded(&["c", "a", "b"]).await;
        let request = PageRequest::new(
            0,
            10,
            Some(Sort::new(SortField::Name, SortDirection::Desc)),
        );

        let page = repos.list_items(&request).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn update_increments_version_only_when_expected_matches() {
        let (repos, created) = seeded(&["a"]).await;
        let id = created[0].id;

        let updated = repos
            .update_item(UpdateItemParams {
                id,
                name: "b".into(),
                description: "b".into(),
                expected_version: 0,
            })
            .await
            .unwrap();
        assert_eq!(updated.version, 1);

        let stale = repos
            .update_item(UpdateItemParams {
                id,
                name: "c".into(),
                description: "c".into(),
                expected_version: 0,
            })
            .await;
        assert!(matches!(
            stale,
            Err(RepoError::VersionConflict {
                expected: 0,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (repos, created) = seeded(&["a"]).await;
        repos.delete_item(created[0].id).await.unwrap();
        assert!(matches!(
            repos.delete_item(created[0].id).await,
            Err(RepoError::NotFound)
        ));
        assert!(repos.find_item(created[0].id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_emails_are_rejected() {
        let repos = InMemoryRepositories::new();
        let params = CreateUserParams {
            email: "Una@Test.com".into(),
            first_name: "una".into(),
            last_name: "Calories".into(),
            enabled: true,
            locked: false,
            authorities: Vec::new(),
        };
        repos.create_user(params.clone()).await.unwrap();
        assert!(matches!(
            repos.create_user(params).await,
            Err(RepoError::Duplicate { .. })
        ));
        assert!(
            repos
                .find_user_by_email("una@test.com")
                .await
                .unwrap()
                .is_some()
        );
    }
}
