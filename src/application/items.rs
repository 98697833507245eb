//! Item reads and mutations, coordinated with the process-wide cache.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{
    CreateItemParams, ItemsRepo, ItemsWriteRepo, RepoError, UpdateItemParams,
};
use crate::cache::{CacheNamespace, ItemCache, PageKey};
use crate::domain::entities::ItemRecord;
use crate::domain::error::DomainError;
use crate::domain::items::ItemDraft;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("item `{0}` not found")]
    NotFound(Uuid),
    #[error("item `{id}` was modified concurrently")]
    Conflict { id: Uuid },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct CreateItemCommand {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateItemCommand {
    pub name: Option<String>,
    pub description: Option<String>,
    /// When set, the update is refused unless the stored version still matches.
    pub expected_version: Option<i32>,
}

#[derive(Clone)]
pub struct ItemService {
    reader: Arc<dyn ItemsRepo>,
    writer: Arc<dyn ItemsWriteRepo>,
    cache: Option<Arc<ItemCache>>,
}

impl ItemService {
    /// `cache` is `None` when caching is disabled.
    pub fn new(
        reader: Arc<dyn ItemsRepo>,
        writer: Arc<dyn ItemsWriteRepo>,
        cache: Option<Arc<ItemCache>>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    pub async fn find_all(&self, request: &PageRequest) -> Result<Page<ItemRecord>, ItemError> {
        let Some(cache) = self.cache.as_deref() else {
            return Ok(self.reader.list_items(request).await?);
        };

        let key = PageKey::from(request);
        if let Some(page) = cache.get_page(&key) {
            return Ok(page);
        }

        let epoch = cache.epoch(CacheNamespace::Pages);
        let page = self.reader.list_items(request).await?;
        cache.put_page_if_current(epoch, key, page.clone());
        Ok(page)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ItemRecord, ItemError> {
        let Some(cache) = self.cache.as_deref() else {
            return self.load(id).await;
        };

        if let Some(item) = cache.get_item(id) {
            return Ok(item);
        }

        let epoch = cache.epoch(CacheNamespace::Items);
        let item = self.load(id).await?;
        cache.put_item_if_current(epoch, item.clone());
        Ok(item)
    }

    pub async fn create(&self, command: CreateItemCommand) -> Result<ItemRecord, ItemError> {
        let draft = ItemDraft::parse(command.name, command.description)?;

        let item = self
            .writer
            .create_item(CreateItemParams {
                id: Uuid::new_v4(),
                name: draft.name,
                description: draft.description,
            })
            .await?;

        if let Some(cache) = self.cache.as_deref() {
            cache.evict_all_pages();
            cache.put_item(item.clone());
        }

        info!(
            target = "application::items::create",
            item_id = %item.id,
            "item created"
        );
        Ok(item)
    }

    pub async fn update(&self, id: Uuid, command: UpdateItemCommand) -> Result<(), ItemError> {
        let draft = ItemDraft::parse(command.name, command.description)?;
        let current = self.load(id).await?;

        if let Some(expected) = command.expected_version
            && expected != current.version
        {
            debug!(
                target = "application::items::update",
                item_id = %id,
                expected,
                stored = current.version,
                "expected version is stale"
            );
            return Err(ItemError::Conflict { id });
        }

        let updated = self
            .writer
            .update_item(UpdateItemParams {
                id,
                name: draft.name,
                description: draft.description,
                expected_version: current.version,
            })
            .await
            .map_err(|err| match err {
                RepoError::NotFound => ItemError::NotFound(id),
                RepoError::VersionConflict { .. } => ItemError::Conflict { id },
                other => ItemError::Repo(other),
            })?;

        self.invalidate(id);

        info!(
            target = "application::items::update",
            item_id = %id,
            version = updated.version,
            "item updated"
        );
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ItemError> {
        self.load(id).await?;

        self.writer.delete_item(id).await.map_err(|err| match err {
            RepoError::NotFound => ItemError::NotFound(id),
            other => ItemError::Repo(other),
        })?;

        self.invalidate(id);

        info!(
            target = "application::items::delete",
            item_id = %id,
            "item deleted"
        );
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<ItemRecord, ItemError> {
        self.reader
            .find_item(id)
            .await?
            .ok_or(ItemError::NotFound(id))
    }

    fn invalidate(&self, id: Uuid) {
        if let Some(cache) = self.cache.as_deref() {
            cache.evict_item(id);
            cache.evict_all_pages();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::cache::CacheConfig;
    use crate::infra::memory::InMemoryRepositories;

    /// Counts repository reads and can hold a page read until released.
    struct CountingReader {
        inner: Arc<InMemoryRepositories>,
        item_reads: AtomicUsize,
        page_reads: AtomicUsize,
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl CountingReader {
        fn new(inner: Arc<InMemoryRepositories>) -> Self {
            Self {
                inner,
                item_reads: AtomicUsize::new(0),
                page_reads: AtomicUsize::new(0),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl ItemsRepo for CountingReader {
        async fn find_item(&self, id: Uuid) -> Result<Option<ItemRecord>, RepoError> {
            self.item_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.find_item(id).await
        }

        async fn list_items(&self, request: &PageRequest) -> Result<Page<ItemRecord>, RepoError> {
            self.page_reads.fetch_add(1, Ordering::SeqCst);
            let page = self.inner.list_items(request).await?;
            if let Some((reached, release)) = &self.gate {
                reached.notify_one();
                release.notified().await;
            }
            Ok(page)
        }
    }

    fn service_with_cache() -> (ItemService, Arc<CountingReader>, Arc<ItemCache>) {
        let repos = Arc::new(InMemoryRepositories::new());
        let reader = Arc::new(CountingReader::new(repos.clone()));
        let cache = Arc::new(ItemCache::new(&CacheConfig::default()));
        let service = ItemService::new(reader.clone(), repos, Some(cache.clone()));
        (service, reader, cache)
    }

    fn create_command(name: &str, description: &str) -> CreateItemCommand {
        CreateItemCommand {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
        }
    }

    fn update_command(name: &str, description: &str) -> UpdateItemCommand {
        UpdateItemCommand {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            expected_version: None,
        }
    }

    #[tokio::test]
    async fn create_starts_at_version_zero_and_populates_cache() {
        let (service, reader, cache) = service_with_cache();

        let item = service.create(create_command("A", "a")).await.unwrap();
        assert_eq!(item.version, 0);
        assert_eq!(cache.get_item(item.id), Some(item.clone()));

        let fetched = service.get_by_id(item.id).await.unwrap();
        assert_eq!(fetched, item);
        assert_eq!(reader.item_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn created_ids_are_distinct() {
        let (service, _, _) = service_with_cache();
        let mut ids = HashSet::new();
        for index in 0..10 {
            let item = service
                .create(create_command(&format!("item-{index}"), "d"))
                .await
                .unwrap();
            ids.insert(item.id);
        }
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn create_rejects_empty_fields() {
        let (service, _, _) = service_with_cache();
        let err = service
            .create(CreateItemCommand {
                name: Some("  ".into()),
                description: Some("d".into()),
            })
            .await
            .unwrap_err();

        let ItemError::Domain(DomainError::Validation { violations }) = err else {
            panic!("expected validation failure, got {err:?}");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
    }

    #[tokio::test]
    async fn repeated_page_reads_hit_cache() {
        let (service, reader, _) = service_with_cache();
        service.create(create_command("A", "a")).await.unwrap();

        let request = PageRequest::default();
        let first = service.find_all(&request).await.unwrap();
        let second = service.find_all(&request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(reader.page_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_bumps_version_and_invalidates() {
        let (service, _, cache) = service_with_cache();
        let item = service.create(create_command("A", "a")).await.unwrap();
        let request = PageRequest::default();
        service.find_all(&request).await.unwrap();

        service
            .update(item.id, update_command("B", "b"))
            .await
            .unwrap();

        assert!(cache.get_item(item.id).is_none());
        assert!(cache.get_page(&PageKey::from(&request)).is_none());

        let updated = service.get_by_id(item.id).await.unwrap();
        assert_eq!(updated.version, 1);
        assert_eq!(updated.name, "B");

        let page = service.find_all(&request).await.unwrap();
        assert_eq!(page.items[0].version, 1);
    }

    #[tokio::test]
    async fn delete_removes_from_reads() {
        let (service, _, _) = service_with_cache();
        let keep = service.create(create_command("A", "a")).await.unwrap();
        let removed = service.create(create_command("B", "b")).await.unwrap();
        let request = PageRequest::default();
        assert_eq!(service.find_all(&request).await.unwrap().total_elements, 2);

        service.delete(removed.id).await.unwrap();

        let page = service.find_all(&request).await.unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.items[0].id, keep.id);
        assert!(matches!(
            service.get_by_id(removed.id).await,
            Err(ItemError::NotFound(id)) if id == removed.id
        ));
    }

    #[tokio::test]
    async fn missing_items_are_not_found() {
        let (service, _, _) = service_with_cache();
        let id = Uuid::new_v4();

        assert!(matches!(service.get_by_id(id).await, Err(ItemError::NotFound(_))));
        assert!(matches!(
            service.update(id, update_command("x", "y")).await,
            Err(ItemError::NotFound(_))
        ));
        assert!(matches!(service.delete(id).await, Err(ItemError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let (service, reader, _) = service_with_cache();

        let result = service
            .update(Uuid::new_v4(), update_command("", "y"))
            .await;

        assert!(matches!(
            result,
            Err(ItemError::Domain(DomainError::Validation { .. }))
        ));
        assert_eq!(reader.item_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stale_expected_version_conflicts() {
        let (service, _, _) = service_with_cache();
        let item = service.create(create_command("A", "a")).await.unwrap();
        service
            .update(item.id, update_command("B", "b"))
            .await
            .unwrap();

        let err = service
            .update(
                item.id,
                UpdateItemCommand {
                    expected_version: Some(0),
                    ..update_command("C", "c")
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::Conflict { .. }));
        assert_eq!(service.get_by_id(item.id).await.unwrap().name, "B");
    }

    #[tokio::test]
    async fn slow_page_read_cannot_refill_after_update() {
        let repos = Arc::new(InMemoryRepositories::new());
        let reached = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut gated = CountingReader::new(repos.clone());
        gated.gate = Some((reached.clone(), release.clone()));

        let cache = Arc::new(ItemCache::new(&CacheConfig::default()));
        let writer_side = ItemService::new(repos.clone(), repos.clone(), Some(cache.clone()));
        let reader_side = ItemService::new(Arc::new(gated), repos.clone(), Some(cache.clone()));

        let item = writer_side.create(create_command("A", "a")).await.unwrap();
        let request = PageRequest::default();

        let slow = tokio::spawn({
            let reader_side = reader_side.clone();
            async move { reader_side.find_all(&request).await }
        });

        reached.notified().await;
        writer_side
            .update(item.id, update_command("B", "b"))
            .await
            .unwrap();
        release.notify_one();

        let stale = slow.await.unwrap().unwrap();
        assert_eq!(stale.items[0].version, 0);
        assert!(cache.get_page(&PageKey::from(&request)).is_none());

        let fresh = writer_side.find_all(&request).await.unwrap();
        assert_eq!(fresh.items[0].version, 1);
    }

    #[tokio::test]
    async fn disabled_cache_always_reads_repository() {
        let repos = Arc::new(InMemoryRepositories::new());
        let reader = Arc::new(CountingReader::new(repos.clone()));
        let service = ItemService::new(reader.clone(), repos, None);

        let item = service.create(create_command("A", "a")).await.unwrap();
        service.get_by_id(item.id).await.unwrap();
        service.get_by_id(item.id).await.unwrap();

        assert_eq!(reader.item_reads.load(Ordering::SeqCst), 2);
    }
}
