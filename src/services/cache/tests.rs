use super::{CacheKeys, CacheTtl, KeyValueCache};
use crate::config::CacheConfig;
use crate::storage::{InMemoryStore, KeyValueStore, RedisPool};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Part {
    id: u32,
    name: String,
}

fn cache_with(store: Arc<dyn KeyValueStore>) -> KeyValueCache {
    KeyValueCache::new(store, &CacheConfig::default())
}

fn memory_cache() -> (Arc<InMemoryStore>, KeyValueCache) {
    let store = Arc::new(InMemoryStore::new());
    (store.clone(), cache_with(store))
}

#[tokio::test]
async fn test_set_then_get() {
    let (_, cache) = memory_cache();
    let part = Part {
        id: 7,
        name: "alternator".to_string(),
    };

    assert!(cache.set(&CacheKeys::part(7), &part, None).await);
    let cached: Option<Part> = cache.get(&CacheKeys::part(7)).await;
    assert_eq!(cached, Some(part));
}

#[tokio::test]
async fn test_keys_carry_the_namespace() {
    let (store, cache) = memory_cache();
    cache.set("user:1", &1, None).await;
    assert!(store.exists("stockyard:user:1").await.unwrap());
    assert!(!store.exists("user:1").await.unwrap());
}

#[tokio::test]
async fn test_default_ttl_applies() {
    let (_, cache) = memory_cache();
    cache.set("k", "v", None).await;
    let ttl = cache.ttl("k").await;
    assert!(ttl > 0 && ttl <= cache.default_ttl().as_secs() as i64);
}

#[tokio::test]
async fn test_explicit_ttl_bounds() {
    let (_, cache) = memory_cache();
    cache.set("k", "v", Some(CacheTtl::SHORT)).await;
    let ttl = cache.ttl("k").await;
    assert!(ttl > 0 && ttl <= 60);
}

#[tokio::test]
async fn test_increment_and_decrement() {
    let (_, cache) = memory_cache();
    assert_eq!(cache.increment("counter", 1).await, Some(1));
    assert_eq!(cache.increment("counter", 5).await, Some(6));
    assert_eq!(cache.decrement("counter", 2).await, Some(4));
}

#[tokio::test]
async fn test_delete_pattern_removes_only_matches() {
    let (_, cache) = memory_cache();
    cache.set("user:1", &1, None).await;
    cache.set("user:2", &2, None).await;
    cache.set("product:1", &3, None).await;

    assert_eq!(cache.delete_pattern("user:*").await, 2);
    assert!(!cache.exists("user:1").await);
    assert!(!cache.exists("user:2").await);
    assert!(cache.exists("product:1").await);
}

#[tokio::test]
async fn test_malformed_payload_is_a_miss() {
    let (store, cache) = memory_cache();
    store
        .set("stockyard:part:1", "{not json", None)
        .await
        .unwrap();

    let cached: Option<Part> = cache.get("part:1").await;
    assert!(cached.is_none());
    assert_eq!(cache.stats().misses, 1);
}

#[tokio::test]
async fn test_get_or_set_fetches_once() {
    let (_, cache) = memory_cache();
    let counter = AtomicUsize::new(0);
    let calls = &counter;

    for _ in 0..3 {
        let value: u32 = cache
            .get_or_set(
                "answer",
                move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                },
                Some(CacheTtl::SHORT),
            )
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_or_set_propagates_fetch_errors() {
    let (_, cache) = memory_cache();
    let result: crate::utils::error::Result<u32> = cache
        .get_or_set(
            "broken",
            || async { Err(crate::utils::error::ServiceError::internal("db down")) },
            None,
        )
        .await;
    assert!(result.is_err());
    assert!(!cache.exists("broken").await);
}

#[tokio::test]
async fn test_invalidate_entity_clears_list_pages() {
    let (_, cache) = memory_cache();
    cache.set(&CacheKeys::vehicle(9), &"car", None).await;
    cache.set(&CacheKeys::list_page("vehicle", 1), &[9], None).await;
    cache.set(&CacheKeys::list_page("vehicle", 2), &[10], None).await;
    cache.set(&CacheKeys::part(9), &"bolt", None).await;

    assert_eq!(cache.invalidate_entity("vehicle", 9).await, 3);
    assert!(cache.exists(&CacheKeys::part(9)).await);
}

#[tokio::test]
async fn test_get_many_skips_malformed() {
    let (store, cache) = memory_cache();
    cache
        .set_many(
            &[("a".to_string(), 1u32), ("b".to_string(), 2u32)],
            None,
        )
        .await;
    store
        .set("stockyard:c", "oops", Some(Duration::from_secs(10)))
        .await
        .unwrap();

    let found: std::collections::HashMap<String, u32> = cache
        .get_many(&["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()])
        .await;
    assert_eq!(found.len(), 2);
    assert_eq!(found["a"], 1);
    assert_eq!(found["b"], 2);
}

#[tokio::test]
async fn test_offline_store_degrades_to_misses() {
    let cache = cache_with(Arc::new(RedisPool::create_offline()));

    assert!(!cache.set("k", &1, None).await);
    let value: Option<u32> = cache.get("k").await;
    assert!(value.is_none());
    assert_eq!(cache.ttl("k").await, -2);
    assert_eq!(cache.increment("n", 1).await, None);
    assert_eq!(cache.delete_pattern("*").await, 0);
    assert!(cache.stats().errors >= 4);
}

#[test]
fn test_search_key_encodes_filters() {
    let key = CacheKeys::search("brake pads", &serde_json::json!({"make": "volvo"}));
    assert!(key.starts_with("search:brake pads:"));
    assert!(key.ends_with("eyJtYWtlIjoidm9sdm8ifQ=="));
}
