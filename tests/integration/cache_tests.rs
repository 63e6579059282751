//! Cache integration tests
//!
//! The cache shares its store with sessions and quotas, and must keep
//! serving callers when the store is down.

#[cfg(test)]
mod tests {
    use crate::common::memory_context;
    use crate::{assert_approx_eq, assert_err, assert_ok};
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stockyard::ServiceError;
    use stockyard::config::CacheConfig;
    use stockyard::services::{CacheKeys, CacheTtl, KeyValueCache, NewSession};
    use stockyard::storage::{KeyValueStore, RedisPool};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Vehicle {
        id: u32,
        make: String,
        year: u16,
    }

    fn vehicle(id: u32) -> Vehicle {
        Vehicle {
            id,
            make: "Volvo".to_string(),
            year: 1998,
        }
    }

    // ==================== Read-through ====================

    #[tokio::test]
    async fn test_get_or_set_fetches_once() {
        let ctx = memory_context().await;
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let value: Vehicle = assert_ok!(
                ctx.cache
                    .get_or_set(
                        &CacheKeys::vehicle(7),
                        || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok(vehicle(7))
                        },
                        Some(CacheTtl::MEDIUM),
                    )
                    .await
            );
            assert_eq!(value, vehicle(7));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = ctx.cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_approx_eq!(stats.hit_rate, 2.0 / 3.0);
    }

    #[tokio::test]
    async fn test_get_or_set_propagates_fetch_error_without_caching() {
        let ctx = memory_context().await;
        let key = CacheKeys::part(1);

        let err = assert_err!(
            ctx.cache
                .get_or_set::<Vehicle, _, _>(
                    &key,
                    || async { Err(ServiceError::internal("catalog offline")) },
                    None,
                )
                .await
        );
        assert!(matches!(err, ServiceError::Internal(_)));
        assert!(!ctx.cache.exists(&key).await);
    }

    // ==================== Invalidation ====================

    #[tokio::test]
    async fn test_invalidate_entity_drops_entity_and_list_pages() {
        let ctx = memory_context().await;
        let cache = &ctx.cache;

        assert!(cache.set(&CacheKeys::vehicle(7), &vehicle(7), None).await);
        assert!(cache.set(&CacheKeys::vehicle(8), &vehicle(8), None).await);
        for page in 1..=3 {
            assert!(
                cache
                    .set(&CacheKeys::list_page("vehicle", page), &vec![7, 8], None)
                    .await
            );
        }
        assert!(cache.set(&CacheKeys::list_page("part", 1), &vec![1], None).await);

        // One entity plus three pages
        assert_eq!(cache.invalidate_entity("vehicle", 7).await, 4);
        assert!(!cache.exists(&CacheKeys::vehicle(7)).await);
        assert!(cache.exists(&CacheKeys::vehicle(8)).await);
        assert!(cache.exists(&CacheKeys::list_page("part", 1)).await);
    }

    #[tokio::test]
    async fn test_pattern_delete_stays_inside_cache_namespace() {
        let ctx = memory_context().await;
        assert!(ctx.cache.set("user:1", &"cached", None).await);
        assert!(
            ctx.sessions
                .create_session("user:1", NewSession::new("1"), None)
                .await
                .is_some()
        );

        assert_eq!(ctx.cache.delete_pattern("*").await, 1);
        assert!(ctx.sessions.get_session("user:1").await.is_some());
    }

    // ==================== Batches and counters ====================

    #[tokio::test]
    async fn test_set_many_get_many_skips_missing() {
        let ctx = memory_context().await;
        let entries = vec![
            (CacheKeys::seller(1), "north".to_string()),
            (CacheKeys::seller(2), "south".to_string()),
        ];
        assert!(ctx.cache.set_many(&entries, Some(CacheTtl::SHORT)).await);

        let keys = vec![CacheKeys::seller(1), CacheKeys::seller(2), CacheKeys::seller(3)];
        let found: std::collections::HashMap<String, String> = ctx.cache.get_many(&keys).await;
        assert_eq!(found.len(), 2);
        assert_eq!(found.get("seller:2").map(String::as_str), Some("south"));

        let ttl = ctx.cache.ttl(&CacheKeys::seller(1)).await;
        assert!((1..=60).contains(&ttl));
    }

    #[tokio::test]
    async fn test_counters_are_shared_by_clones() {
        let ctx = memory_context().await;
        let other = ctx.cache.clone();

        assert_eq!(ctx.cache.increment("views:part:1", 5).await, Some(5));
        assert_eq!(other.decrement("views:part:1", 2).await, Some(3));
        assert_eq!(ctx.cache.get::<i64>("views:part:1").await, Some(3));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_a_miss() {
        let ctx = memory_context().await;
        assert_ok!(
            ctx.store
                .set(&ctx.cache.namespaced("broken"), "{not json", None)
                .await
        );

        assert_eq!(ctx.cache.get::<Vehicle>("broken").await, None);
        assert_eq!(ctx.cache.stats().misses, 1);
    }

    // ==================== Store outage ====================

    #[tokio::test]
    async fn test_offline_store_fails_open() {
        let cache = KeyValueCache::new(
            Arc::new(RedisPool::create_offline()),
            &CacheConfig::default(),
        );

        assert_eq!(cache.get::<Vehicle>("vehicle:1").await, None);
        assert!(!cache.set("vehicle:1", &vehicle(1), None).await);
        assert!(!cache.delete("vehicle:1").await);
        assert_eq!(cache.delete_pattern("vehicle:*").await, 0);
        assert_eq!(cache.increment("hits", 1).await, None);
        assert!(cache.ttl("vehicle:1").await < 0);

        // Read-through still answers from the source.
        let value: Vehicle = assert_ok!(
            cache
                .get_or_set("vehicle:1", || async { Ok(vehicle(1)) }, None)
                .await
        );
        assert_eq!(value, vehicle(1));
        assert!(cache.stats().errors >= 4);
    }
}
