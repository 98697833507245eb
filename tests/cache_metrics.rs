use std::collections::HashSet;

use metrics_util::debugging::DebuggingRecorder;
use primer::application::pagination::{Page, PageRequest};
use primer::cache::{CacheConfig, CacheNamespace, ItemCache, PageKey};
use primer::domain::entities::ItemRecord;
use time::OffsetDateTime;
use uuid::Uuid;

fn sample_item(name: &str) -> ItemRecord {
    ItemRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: "Metrics test item".to_string(),
        version: 0,
        created_at: OffsetDateTime::now_utc(),
    }
}

#[test]
fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let cache = ItemCache::new(&CacheConfig {
        item_limit: 1,
        ..Default::default()
    });

    // miss, hit, capacity eviction
    let first = sample_item("first");
    let second = sample_item("second");
    assert!(cache.get_item(first.id).is_none());
    cache.put_item(first.clone());
    assert!(cache.get_item(first.id).is_some());
    cache.put_item(second);

    // stale page refill
    let request = PageRequest::default();
    let epoch = cache.epoch(CacheNamespace::Pages);
    cache.evict_all_pages();
    assert!(!cache.put_page_if_current(
        epoch,
        PageKey::from(&request),
        Page::new(Vec::new(), &request, 0),
    ));

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for expected in [
        "primer_cache_hit_total",
        "primer_cache_miss_total",
        "primer_cache_evict_total",
        "primer_cache_stale_fill_total",
    ] {
        assert!(names.contains(expected), "missing metric {expected}: {names:?}");
    }
}
