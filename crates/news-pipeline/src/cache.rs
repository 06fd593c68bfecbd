use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sentiment_core::{FetchOutcome, FetchRequest, NewsItem};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Cached fetch result with timestamp
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        // A clock that moved backwards gives a negative age, which counts as fresh.
        let age = (Utc::now() - self.cached_at).to_std().unwrap_or_default();
        age < ttl
    }
}

type Slot = Arc<Mutex<Option<CacheEntry<Vec<NewsItem>>>>>;

/// Time-bounded memoization of fetch results, keyed by the full request.
///
/// Each key owns an async mutex, so concurrent callers for the same key wait
/// for the one in-flight fetch instead of issuing their own. Only successful
/// fetches are stored; a failed fetch leaves the slot empty and the next
/// caller fetches again. Every fetch prunes slots that are stale or empty.
pub struct FreshnessCache {
    ttl: Duration,
    slots: DashMap<FetchRequest, Slot>,
}

impl FreshnessCache {
    /// A zero `ttl` disables caching entirely.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: DashMap::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached items for `key` when fresh, otherwise run `fetch`
    /// and remember a successful result. The boolean is true on a cache hit.
    pub async fn get_or_fetch<F, Fut>(&self, key: &FetchRequest, fetch: F) -> (FetchOutcome, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchOutcome>,
    {
        if !self.is_enabled() {
            return (fetch().await, false);
        }

        // Clone the slot out so the map shard is not held across the await.
        let slot: Slot = self.slots.entry(key.clone()).or_default().clone();
        let mut guard = slot.lock().await;

        if let Some(entry) = guard.as_ref() {
            if entry.is_fresh(self.ttl) {
                tracing::debug!("Cache hit for '{}'", key.query);
                return (
                    FetchOutcome {
                        items: entry.data.clone(),
                        failure: None,
                    },
                    true,
                );
            }
        }

        let outcome = fetch().await;
        if outcome.is_failure() {
            *guard = None;
        } else {
            *guard = Some(CacheEntry {
                data: outcome.items.clone(),
                cached_at: Utc::now(),
            });
        }
        drop(guard);
        self.prune();

        (outcome, false)
    }

    /// Drop slots whose entry is stale or missing. Slots with a fetch in
    /// flight are kept.
    pub fn prune(&self) {
        let ttl = self.ttl;
        self.slots.retain(|_, slot| match slot.try_lock() {
            Ok(entry) => entry.as_ref().is_some_and(|e| e.is_fresh(ttl)),
            Err(_) => true,
        });
    }

    pub fn invalidate(&self, key: &FetchRequest) {
        self.slots.remove(key);
    }

    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Number of slots held, including entries not yet pruned
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sentiment_core::{FetchError, TimeWindow};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(query: &str) -> FetchRequest {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        FetchRequest::new(query, TimeWindow::ending_on(day, 1)).unwrap()
    }

    async fn counted_fetch(calls: &AtomicUsize, outcome: FetchOutcome) -> FetchOutcome {
        calls.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    fn ok_outcome() -> FetchOutcome {
        FetchOutcome {
            items: vec![NewsItem::new("Nifty gains")],
            failure: None,
        }
    }

    #[tokio::test]
    async fn test_fresh_entry_is_reused() {
        let cache = FreshnessCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        let (first, hit) = cache.get_or_fetch(&key("Nifty"), || counted_fetch(&calls, ok_outcome())).await;
        assert!(!hit);
        assert_eq!(first.items.len(), 1);

        let (second, hit) = cache.get_or_fetch(&key("Nifty"), || counted_fetch(&calls, ok_outcome())).await;
        assert!(hit);
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_separately() {
        let cache = FreshnessCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch(&key("Nifty"), || counted_fetch(&calls, ok_outcome())).await;
        cache.get_or_fetch(&key("BankNifty"), || counted_fetch(&calls, ok_outcome())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let cache = FreshnessCache::disabled();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let (_, hit) = cache.get_or_fetch(&key("Nifty"), || counted_fetch(&calls, ok_outcome())).await;
            assert!(!hit);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let cache = FreshnessCache::new(Duration::from_millis(20));
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch(&key("Nifty"), || counted_fetch(&calls, ok_outcome())).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let (_, hit) = cache.get_or_fetch(&key("Nifty"), || counted_fetch(&calls, ok_outcome())).await;
        assert!(!hit);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = FreshnessCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);
        let failed = FetchOutcome::from(Err(FetchError::Transport("reset".into())));

        let (outcome, _) = cache.get_or_fetch(&key("Nifty"), || counted_fetch(&calls, failed.clone())).await;
        assert!(outcome.is_failure());
        assert!(cache.is_empty());

        let (outcome, hit) = cache.get_or_fetch(&key("Nifty"), || counted_fetch(&calls, ok_outcome())).await;
        assert!(!hit);
        assert!(!outcome.is_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_slots_are_pruned() {
        let cache = FreshnessCache::new(Duration::from_millis(20));
        let calls = AtomicUsize::new(0);

        for day in 1..=5 {
            let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            let request = FetchRequest::new("Nifty", TimeWindow::ending_on(date, 1)).unwrap();
            cache.get_or_fetch(&request, || counted_fetch(&calls, ok_outcome())).await;
            tokio::time::sleep(Duration::from_millis(40)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(cache.len(), 1);

        cache.prune();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache = Arc::new(FreshnessCache::new(Duration::from_secs(300)));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                let (outcome, _) = cache
                    .get_or_fetch(&key("Nifty"), || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        ok_outcome()
                    })
                    .await;
                outcome.items.len()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = FreshnessCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch(&key("Nifty"), || counted_fetch(&calls, ok_outcome())).await;
        cache.invalidate(&key("Nifty"));
        cache.get_or_fetch(&key("Nifty"), || counted_fetch(&calls, ok_outcome())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
