//! Session directory integration tests

#[cfg(test)]
mod tests {
    use crate::common::memory_context;
    use crate::{assert_err, assert_ok};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use stockyard::ServiceError;
    use stockyard::config::{CacheConfig, SessionConfig};
    use stockyard::services::{NewSession, SessionDirectory, SessionUpdate};
    use stockyard::storage::{KeyValueStore, RedisPool};

    // ==================== Lifecycle ====================

    #[tokio::test]
    async fn test_create_read_update_delete() {
        let ctx = memory_context().await;
        let sessions = &ctx.sessions;

        let created = sessions
            .create_session(
                "s-1",
                NewSession::new("42")
                    .with_role("seller")
                    .with_field("cart", json!([101, 102])),
                None,
            )
            .await
            .unwrap();
        assert_eq!(created.ttl_secs, 86_400);

        let fetched = sessions.get_session("s-1").await.unwrap();
        assert_eq!(fetched.user_id, "42");
        assert_eq!(fetched.role.as_deref(), Some("seller"));
        assert!(fetched.last_accessed >= created.last_accessed);

        let mut data = serde_json::Map::new();
        data.insert("cart".to_string(), serde_json::Value::Null);
        data.insert("theme".to_string(), json!("dark"));
        let updated = assert_ok!(
            sessions
                .update_session(
                    "s-1",
                    SessionUpdate {
                        role: Some("admin".to_string()),
                        data,
                    },
                )
                .await
        );
        assert_eq!(updated.role.as_deref(), Some("admin"));
        assert!(!updated.data.contains_key("cart"));
        assert_eq!(updated.data.get("theme"), Some(&json!("dark")));
        assert_eq!(updated.created_at, created.created_at);

        assert!(sessions.delete_session("s-1").await);
        assert!(!sessions.delete_session("s-1").await);
        assert!(sessions.get_session("s-1").await.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_session_is_not_found() {
        let ctx = memory_context().await;
        let err = assert_err!(
            ctx.sessions
                .update_session("ghost", SessionUpdate::default())
                .await
        );
        assert!(matches!(err, ServiceError::SessionNotFound(ref id) if id == "ghost"));
    }

    // ==================== Sliding expiry ====================

    #[tokio::test]
    async fn test_read_rearms_default_ttl() {
        let ctx = memory_context().await;
        let sessions = &ctx.sessions;
        sessions
            .create_session("short", NewSession::new("7"), Some(Duration::from_secs(30)))
            .await
            .unwrap();
        assert!(ctx.store.ttl("session:short").await.unwrap() <= 30);

        let session = sessions.get_session("short").await.unwrap();
        assert_eq!(session.ttl_secs, 86_400);
        assert!(ctx.store.ttl("session:short").await.unwrap() > 86_000);
    }

    #[tokio::test]
    async fn test_touch_only_existing_sessions() {
        let ctx = memory_context().await;
        ctx.sessions
            .create_session("t", NewSession::new("7"), Some(Duration::from_secs(10)))
            .await
            .unwrap();

        assert!(ctx.sessions.touch("t").await);
        assert!(!ctx.sessions.touch("missing").await);
        assert!(ctx.store.ttl("session:t").await.unwrap() > 10);
    }

    #[tokio::test]
    async fn test_expired_session_is_gone() {
        let ctx = memory_context().await;
        ctx.sessions
            .create_session("blink", NewSession::new("7"), Some(Duration::from_millis(50)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(ctx.sessions.get_session("blink").await.is_none());
        assert_eq!(ctx.sessions.count().await, 0);
    }

    // ==================== Per-user operations ====================

    #[tokio::test]
    async fn test_list_and_revoke_for_user() {
        let ctx = memory_context().await;
        let sessions = &ctx.sessions;
        for (id, user) in [("a", "1"), ("b", "1"), ("c", "2")] {
            sessions
                .create_session(id, NewSession::new(user), None)
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let mine = sessions.list_sessions_for_user("1").await;
        let ids: Vec<&str> = mine.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(sessions.count().await, 3);

        assert_eq!(sessions.revoke_all_for_user("1").await, 2);
        assert_eq!(sessions.revoke_all_for_user("1").await, 0);
        assert_eq!(sessions.count().await, 1);
        assert!(sessions.get_session("c").await.is_some());
    }

    #[tokio::test]
    async fn test_cleanup_removes_expiring_and_persistent_sessions() {
        let ctx = memory_context().await;
        let sessions = &ctx.sessions;
        sessions
            .create_session("long", NewSession::new("1"), None)
            .await
            .unwrap();
        sessions
            .create_session("dying", NewSession::new("1"), Some(Duration::from_secs(3)))
            .await
            .unwrap();
        // A record without an expiry, e.g. written by hand
        let stray = serde_json::to_string(&sessions.get_session("long").await.unwrap()).unwrap();
        assert_ok!(ctx.store.set("session:stray", &stray, None).await);

        assert_eq!(sessions.cleanup_expired().await, 2);
        assert_eq!(sessions.count().await, 1);
        assert!(sessions.get_session("long").await.is_some());
    }

    // ==================== Store outage ====================

    #[tokio::test]
    async fn test_offline_store_degrades_quietly() {
        let sessions = SessionDirectory::new(
            Arc::new(RedisPool::create_offline()),
            &SessionConfig::default(),
            &CacheConfig::default(),
        );

        assert!(
            sessions
                .create_session("s", NewSession::new("1"), None)
                .await
                .is_none()
        );
        assert!(sessions.get_session("s").await.is_none());
        assert!(sessions.list_sessions_for_user("1").await.is_empty());
        assert_eq!(sessions.cleanup_expired().await, 0);

        let err = assert_err!(sessions.update_session("s", SessionUpdate::default()).await);
        assert!(err.is_store_unavailable());
    }
}
