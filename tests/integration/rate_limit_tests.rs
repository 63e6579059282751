//! Quota limiter integration tests
//!
//! Limiters built over one store share counters, the way several processes
//! behind a load balancer share one Redis.

#[cfg(test)]
mod tests {
    use crate::assert_ok;
    use std::sync::Arc;
    use std::time::Duration;
    use stockyard::config::{QuotaClassConfig, RateLimitConfig};
    use stockyard::services::rate_limit::RedisQuotaBackend;
    use stockyard::services::{BackendKind, ClientIdentity, QuotaClass, QuotaLimiter};
    use stockyard::storage::{InMemoryStore, KeyValueStore, RedisPool};

    fn strict_config() -> RateLimitConfig {
        RateLimitConfig {
            auth: QuotaClassConfig::new(2, 60, Some(300)),
            general: QuotaClassConfig::new(3, 60, None),
            ..RateLimitConfig::default()
        }
    }

    async fn shared_limiters() -> (QuotaLimiter, QuotaLimiter, Arc<dyn KeyValueStore>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        let config = strict_config();
        let first = QuotaLimiter::from_config(&config, store.clone()).await;
        let second = QuotaLimiter::from_config(&config, store.clone()).await;
        (first, second, store)
    }

    // ==================== Backend selection ====================

    #[tokio::test]
    async fn test_reachable_store_selects_distributed_backend() {
        let (limiter, _, _) = shared_limiters().await;
        assert_eq!(limiter.backend_kind(), BackendKind::Distributed);
    }

    #[tokio::test]
    async fn test_unreachable_store_falls_back_to_local_backend() {
        let limiter =
            QuotaLimiter::from_config(&strict_config(), Arc::new(RedisPool::create_offline())).await;
        assert_eq!(limiter.backend_kind(), BackendKind::Local);

        // Limiting keeps working per process.
        for _ in 0..3 {
            assert!(assert_ok!(limiter.consume(QuotaClass::General, "ip:10.0.0.1").await).is_allowed());
        }
        assert!(!assert_ok!(limiter.consume(QuotaClass::General, "ip:10.0.0.1").await).is_allowed());
    }

    // ==================== Shared counters ====================

    #[tokio::test]
    async fn test_counters_are_shared_across_limiters() {
        let (first, second, _) = shared_limiters().await;
        let key = ClientIdentity::resolve(None, Some("42"), None).key();

        let a = assert_ok!(first.consume(QuotaClass::General, &key).await);
        let b = assert_ok!(second.consume(QuotaClass::General, &key).await);
        let c = assert_ok!(first.consume(QuotaClass::General, &key).await);
        assert_eq!(a.meta().remaining, 2);
        assert_eq!(b.meta().remaining, 1);
        assert_eq!(c.meta().remaining, 0);

        let rejected = assert_ok!(second.consume(QuotaClass::General, &key).await);
        assert!(!rejected.is_allowed());
        let retry = rejected.meta().retry_after.unwrap();
        assert!(retry <= Duration::from_secs(60));
        assert!(rejected.meta().retry_after_secs().unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_classes_count_independently() {
        let (limiter, _, _) = shared_limiters().await;
        for _ in 0..3 {
            assert_ok!(limiter.consume(QuotaClass::General, "user:1").await);
        }
        let auth = assert_ok!(limiter.consume(QuotaClass::Auth, "user:1").await);
        assert!(auth.is_allowed());
        assert_eq!(auth.meta().limit, 2);
    }

    // ==================== Blocking ====================

    #[tokio::test]
    async fn test_auth_exhaustion_blocks_key() {
        let (first, second, _) = shared_limiters().await;
        let key = "ip:192.0.2.7";

        assert!(assert_ok!(first.consume(QuotaClass::Auth, key).await).is_allowed());
        assert!(assert_ok!(first.consume(QuotaClass::Auth, key).await).is_allowed());

        let rejected = assert_ok!(first.consume(QuotaClass::Auth, key).await);
        assert!(!rejected.is_allowed());
        assert_eq!(rejected.meta().retry_after, Some(Duration::from_secs(300)));

        // The block is visible through the other limiter.
        let still_blocked = assert_ok!(second.consume(QuotaClass::Auth, key).await);
        assert!(!still_blocked.is_allowed());
        assert_eq!(still_blocked.meta().remaining, 0);

        let status = second.status(key).await;
        let auth = status
            .iter()
            .find(|outcome| outcome.class == QuotaClass::Auth)
            .unwrap();
        assert!(auth.is_ok());
        assert!(auth.value.as_ref().unwrap().as_ref().unwrap().blocked_until.is_some());
    }

    #[tokio::test]
    async fn test_reset_clears_every_class() {
        let (limiter, other, _) = shared_limiters().await;
        let key = "ip:192.0.2.8";
        for _ in 0..3 {
            assert_ok!(limiter.consume(QuotaClass::Auth, key).await);
            assert_ok!(limiter.consume(QuotaClass::General, key).await);
        }

        let outcomes = other.reset(key).await;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.is_ok()));

        assert!(limiter.status(key).await.iter().all(|o| o.value == Some(None)));
        assert!(assert_ok!(limiter.consume(QuotaClass::Auth, key).await).is_allowed());
    }

    // ==================== Classification ====================

    #[tokio::test]
    async fn test_classification_priority() {
        let (limiter, _, _) = shared_limiters().await;
        let keyed = ClientIdentity::resolve(Some("sk-live-1"), Some("42"), Some("10.0.0.1"));
        let user = ClientIdentity::resolve(None, Some("42"), Some("10.0.0.1"));

        assert_eq!(limiter.classify("/auth/login", &keyed), QuotaClass::Auth);
        assert_eq!(limiter.classify("/parts", &keyed), QuotaClass::Api);
        assert_eq!(limiter.classify("/parts", &user), QuotaClass::General);
        assert!(!keyed.key().contains("sk-live-1"));
    }

    #[tokio::test]
    async fn test_store_outage_after_start_surfaces_as_error() {
        let store: Arc<dyn KeyValueStore> = Arc::new(RedisPool::create_offline());
        let config = RateLimitConfig::default();
        let limiter = QuotaLimiter::with_backend(
            &config,
            Arc::new(RedisQuotaBackend::new(store, config.key_prefix.clone())),
        );

        let result = limiter.consume(QuotaClass::General, "user:1").await;
        assert!(result.unwrap_err().is_store_unavailable());

        let status = limiter.status("user:1").await;
        assert!(status.iter().all(|o| o.error.is_some()));
    }
}
