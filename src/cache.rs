use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Clone)]
pub struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

struct CacheState<T> {
    entries: HashMap<String, CacheEntry<T>>,
    last_sweep: Instant,
}

/// Expiring key/value store for successful responses.
///
/// Expired entries are never returned by [`ResponseCache::get`]. They are
/// physically removed either on lookup or by the sweep that `set` runs once
/// per `cleanup_interval`.
pub struct ResponseCache<T: Clone> {
    state: Arc<RwLock<CacheState<T>>>,
    default_ttl: Duration,
    cleanup_interval: Duration,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(default_ttl: Duration, cleanup_interval: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState {
                entries: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            default_ttl,
            cleanup_interval,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let mut state = self.state.write().await;
        let now = Instant::now();

        let expired = match state.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.data.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            state.entries.remove(key);
            log::debug!("Cache expired: {}", key);
        }
        None
    }

    pub async fn set(&self, key: String, data: T, ttl: Duration) {
        let mut state = self.state.write().await;
        let now = Instant::now();

        if now.saturating_duration_since(state.last_sweep) >= self.cleanup_interval {
            let removed = Self::sweep(&mut state.entries, now);
            state.last_sweep = now;
            if removed > 0 {
                log::debug!("Swept {} expired cache entries", removed);
            }
        }

        state.entries.insert(key, CacheEntry::new(data, ttl));
    }

    /// Returns the cached value for `key`, or runs `fetch_fn` and caches its
    /// result with the default TTL. Errors are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch_fn: F) -> crate::error::Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = crate::error::Result<T>>,
    {
        if let Some(cached) = self.get(key).await {
            log::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        log::debug!("Cache miss: {}", key);
        let data = fetch_fn().await?;
        self.set(key.to_string(), data.clone(), self.default_ttl).await;

        Ok(data)
    }

    pub async fn cleanup_expired(&self) -> usize {
        let mut state = self.state.write().await;
        let now = Instant::now();
        state.last_sweep = now;
        Self::sweep(&mut state.entries, now)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn sweep(entries: &mut HashMap<String, CacheEntry<T>>, now: Instant) -> usize {
        let initial_count = entries.len();

        entries.retain(|key, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                log::debug!("Expired cache entry: {}", key);
            }
            keep
        });

        initial_count - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PostError;
    use assert_matches::assert_matches;

    const TTL: Duration = Duration::from_secs(300);
    const CLEANUP: Duration = Duration::from_secs(600);

    #[tokio::test(start_paused = true)]
    async fn test_get_within_ttl_returns_value() {
        let cache = ResponseCache::new(TTL, CLEANUP);
        cache.set("http://localhost/users".to_string(), 42u32, TTL).await;

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("http://localhost/users").await, Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_after_ttl_is_absent() {
        let cache = ResponseCache::new(TTL, CLEANUP);
        cache.set("k".to_string(), "v".to_string(), TTL).await;

        tokio::time::advance(TTL).await;
        assert_eq!(cache.get("k").await, None);
        // lookup reclaimed the slot
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_sweeps_after_cleanup_interval() {
        let cache = ResponseCache::new(TTL, CLEANUP);
        cache.set("old".to_string(), 1u8, Duration::from_secs(1)).await;

        tokio::time::advance(Duration::from_secs(5)).await;
        cache.set("fresh".to_string(), 2u8, TTL).await;
        // sweep has not run yet, expired entry still occupies space
        assert_eq!(cache.len().await, 2);

        tokio::time::advance(CLEANUP).await;
        cache.set("newer".to_string(), 3u8, TTL).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("newer").await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_expired_counts_removed() {
        let cache = ResponseCache::new(TTL, CLEANUP);
        cache.set("a".to_string(), 1u8, Duration::from_secs(1)).await;
        cache.set("b".to_string(), 2u8, Duration::from_secs(1)).await;
        cache.set("c".to_string(), 3u8, TTL).await;

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.cleanup_expired().await, 2);
        assert_eq!(cache.len().await, 1);
    }

    #[test]
    fn test_get_or_fetch_caches_success_only() {
        tokio_test::block_on(async {
            let cache: ResponseCache<String> = ResponseCache::new(TTL, CLEANUP);

            let failed = cache
                .get_or_fetch("k", || async { Err(PostError::InvalidInput("boom".to_string())) })
                .await;
            assert_matches!(failed, Err(PostError::InvalidInput(_)));
            assert!(cache.is_empty().await);

            let first = cache
                .get_or_fetch("k", || async { Ok("fetched".to_string()) })
                .await
                .unwrap();
            let second = cache
                .get_or_fetch("k", || async { Ok("refetched".to_string()) })
                .await
                .unwrap();

            assert_eq!(first, "fetched");
            assert_eq!(second, "fetched");
        });
    }
}
