//! Cache storage.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use metrics::counter;
use tracing::debug;
use uuid::Uuid;

use crate::application::pagination::Page;
use crate::domain::entities::ItemRecord;

use super::config::CacheConfig;
use super::keys::{CacheKey, CacheNamespace, PageKey};
use super::lock::{rw_read, rw_write};
use super::{
    METRIC_CACHE_EVICT_TOTAL, METRIC_CACHE_HIT_TOTAL, METRIC_CACHE_MISS_TOTAL,
    METRIC_CACHE_STALE_FILL_TOTAL,
};

const SOURCE: &str = "cache::store";

/// Invalidation counter of a namespace.
///
/// Bumped on every eviction while the namespace's write lock is held, so comparing it under
/// the same lock tells whether anything was invalidated in between.
pub type Epoch = u64;

/// Single-item and page caches in front of the item repository.
pub struct ItemCache {
    items: RwLock<LruCache<Uuid, ItemRecord>>,
    pages: RwLock<LruCache<PageKey, Page<ItemRecord>>>,
    item_epoch: AtomicU64,
    page_epoch: AtomicU64,
}

impl ItemCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            items: RwLock::new(LruCache::new(config.item_limit_non_zero())),
            pages: RwLock::new(LruCache::new(config.page_limit_non_zero())),
            item_epoch: AtomicU64::new(0),
            page_epoch: AtomicU64::new(0),
        }
    }

    /// Current epoch; take it before reading the repository and hand it to the
    /// matching `*_if_current` put.
    pub fn epoch(&self, namespace: CacheNamespace) -> Epoch {
        self.epoch_counter(namespace).load(Ordering::Acquire)
    }

    fn epoch_counter(&self, namespace: CacheNamespace) -> &AtomicU64 {
        match namespace {
            CacheNamespace::Items => &self.item_epoch,
            CacheNamespace::Pages => &self.page_epoch,
        }
    }

    fn bump_epoch(&self, namespace: CacheNamespace) {
        self.epoch_counter(namespace).fetch_add(1, Ordering::AcqRel);
    }

    // ========================================================================
    // Items
    // ========================================================================

    pub fn get_item(&self, id: Uuid) -> Option<ItemRecord> {
        let cached = rw_write(&self.items, SOURCE, "get_item").get(&id).cloned();
        record_lookup(CacheNamespace::Items, cached.is_some());
        cached
    }

    /// Unconditional put, used for values the caller has just written.
    pub fn put_item(&self, item: ItemRecord) {
        let mut items = rw_write(&self.items, SOURCE, "put_item");
        push_item(&mut items, item);
    }

    /// Put a value read from the repository, unless the namespace was invalidated since
    /// `epoch` was taken. Returns whether the value was stored.
    pub fn put_item_if_current(&self, epoch: Epoch, item: ItemRecord) -> bool {
        let mut items = rw_write(&self.items, SOURCE, "put_item_if_current");
        if self.epoch(CacheNamespace::Items) != epoch {
            record_stale_fill(CacheNamespace::Items);
            return false;
        }
        push_item(&mut items, item);
        true
    }

    pub fn evict_item(&self, id: Uuid) {
        self.evict(&CacheKey::Item(id));
    }

    // ========================================================================
    // Pages
    // ========================================================================

    pub fn get_page(&self, key: &PageKey) -> Option<Page<ItemRecord>> {
        let cached = rw_write(&self.pages, SOURCE, "get_page").get(key).cloned();
        record_lookup(CacheNamespace::Pages, cached.is_some());
        cached
    }

    pub fn put_page_if_current(&self, epoch: Epoch, key: PageKey, page: Page<ItemRecord>) -> bool {
        let mut pages = rw_write(&self.pages, SOURCE, "put_page_if_current");
        if self.epoch(CacheNamespace::Pages) != epoch {
            record_stale_fill(CacheNamespace::Pages);
            return false;
        }
        push_page(&mut pages, key, page);
        true
    }

    pub fn evict_all_pages(&self) {
        self.evict_all_of(CacheNamespace::Pages);
    }

    // ========================================================================
    // Generic operations
    // ========================================================================

    /// Drops one entry and bumps its namespace's epoch while the namespace lock is held.
    pub fn evict(&self, key: &CacheKey) {
        match key {
            CacheKey::Item(id) => {
                let mut items = rw_write(&self.items, SOURCE, "evict_item");
                items.pop(id);
                self.bump_epoch(key.namespace());
            }
            CacheKey::Page(page_key) => {
                let mut pages = rw_write(&self.pages, SOURCE, "evict_page");
                pages.pop(page_key);
                self.bump_epoch(key.namespace());
            }
        }
    }

    pub fn evict_all_of(&self, namespace: CacheNamespace) {
        match namespace {
            CacheNamespace::Items => {
                let mut items = rw_write(&self.items, SOURCE, "evict_all_items");
                items.clear();
                self.bump_epoch(namespace);
            }
            CacheNamespace::Pages => {
                let mut pages = rw_write(&self.pages, SOURCE, "evict_all_pages");
                pages.clear();
                self.bump_epoch(namespace);
            }
        }
        debug!(
            target = SOURCE,
            namespace = namespace.as_str(),
            "cache namespace cleared"
        );
    }

    pub fn len(&self, namespace: CacheNamespace) -> usize {
        match namespace {
            CacheNamespace::Items => rw_read(&self.items, SOURCE, "len_items").len(),
            CacheNamespace::Pages => rw_read(&self.pages, SOURCE, "len_pages").len(),
        }
    }
}

fn push_item(items: &mut LruCache<Uuid, ItemRecord>, item: ItemRecord) {
    let id = item.id;
    if let Some((evicted, _)) = items.push(id, item)
        && evicted != id
    {
        record_capacity_evict(CacheNamespace::Items);
    }
}

fn push_page(pages: &mut LruCache<PageKey, Page<ItemRecord>>, key: PageKey, page: Page<ItemRecord>) {
    if let Some((evicted, _)) = pages.push(key, page)
        && evicted != key
    {
        record_capacity_evict(CacheNamespace::Pages);
    }
}

fn record_lookup(namespace: CacheNamespace, hit: bool) {
    let name = if hit {
        METRIC_CACHE_HIT_TOTAL
    } else {
        METRIC_CACHE_MISS_TOTAL
    };
    counter!(name, "namespace" => namespace.as_str()).increment(1);
}

fn record_capacity_evict(namespace: CacheNamespace) {
    counter!(METRIC_CACHE_EVICT_TOTAL, "namespace" => namespace.as_str()).increment(1);
}

fn record_stale_fill(namespace: CacheNamespace) {
    counter!(METRIC_CACHE_STALE_FILL_TOTAL, "namespace" => namespace.as_str()).increment(1);
    debug!(
        target = SOURCE,
        namespace = namespace.as_str(),
        "discarded refill read before an invalidation"
    );
}
