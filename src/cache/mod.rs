//! Process-wide item cache.
//!
//! Two LRU namespaces sit in front of the item repository:
//!
//! - **Items**: single items keyed by id
//! - **Pages**: collection pages keyed by `(page, size, sort)`
//!
//! Every mutation of the repository evicts the affected entries afterwards. Each namespace
//! carries an invalidation epoch so that a reader which started before an eviction cannot
//! put its now-stale result back.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! item_limit = 1000
//! page_limit = 200
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::{CacheKey, CacheNamespace, PageKey};
pub use store::{Epoch, ItemCache};

pub const METRIC_CACHE_HIT_TOTAL: &str = "primer_cache_hit_total";
pub const METRIC_CACHE_MISS_TOTAL: &str = "primer_cache_miss_total";
pub const METRIC_CACHE_EVICT_TOTAL: &str = "primer_cache_evict_total";
pub const METRIC_CACHE_STALE_FILL_TOTAL: &str = "primer_cache_stale_fill_total";
