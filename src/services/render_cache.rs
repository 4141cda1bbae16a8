//! Server-side cache of public page data, invalidated by resource tags.

use crate::models::response::ActionResponse;
use crate::models::Record;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheTag(Cow<'static, str>);

impl CacheTag {
    pub const BANNERS: CacheTag = CacheTag(Cow::Borrowed("banners"));
    pub const CONFIGS: CacheTag = CacheTag(Cow::Borrowed("configs"));
    pub const CONTACTS: CacheTag = CacheTag(Cow::Borrowed("contacts"));
    pub const DOCTORS: CacheTag = CacheTag(Cow::Borrowed("doctors"));
    pub const FACILITIES: CacheTag = CacheTag(Cow::Borrowed("facilities"));
    pub const POSTS: CacheTag = CacheTag(Cow::Borrowed("posts"));
    pub const ROOMS: CacheTag = CacheTag(Cow::Borrowed("rooms"));
    pub const USERS: CacheTag = CacheTag(Cow::Borrowed("users"));

    pub fn post(slug: &str) -> Self {
        CacheTag(Cow::Owned(format!("post:{}", slug)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct Entry {
    response: ActionResponse<Record>,
    tags: Vec<CacheTag>,
    stored_at: Instant,
}

/// Upper bound on cached pages.
pub const MAX_ENTRIES: usize = 1024;

#[derive(Debug)]
pub struct RenderCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl RenderCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<ActionResponse<Record>> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.response.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores successful responses only; failures are never cached.
    ///
    /// Expired entries are swept on every insert and the oldest entry makes
    /// room once `MAX_ENTRIES` is reached.
    pub fn insert(&self, key: &str, tags: &[CacheTag], response: &ActionResponse<Record>) {
        if !response.is_success() {
            return;
        }
        let mut entries = self.lock();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);

        if entries.len() >= MAX_ENTRIES && !entries.contains_key(key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key.to_string(),
            Entry {
                response: response.clone(),
                tags: tags.to_vec(),
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        tags: &[CacheTag],
        fetch: F,
    ) -> ActionResponse<Record>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ActionResponse<Record>>,
    {
        if let Some(cached) = self.get(key) {
            debug!("Render cache hit: {}", key);
            return cached;
        }

        let response = fetch().await;
        self.insert(key, tags, &response);
        response
    }

    pub fn revalidate_tag(&self, tag: &CacheTag) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.contains(tag));
        let removed = before - entries.len();
        info!("Revalidated tag '{}' ({} cached entries dropped)", tag, removed);
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::response::{ErrorDetails, ErrorKind};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_get_or_fetch_reuses_fresh_entry() {
        let cache = RenderCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let response = cache
                .get_or_fetch("/banners", &[CacheTag::BANNERS], || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    ActionResponse::success(json!([{ "id": 1 }]))
                })
                .await;
            assert_eq!(response.data(), Some(&json!([{ "id": 1 }])));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = RenderCache::new(Duration::from_secs(60));

        cache
            .get_or_fetch("/rooms", &[CacheTag::ROOMS], || async {
                ActionResponse::failure(ErrorDetails::new(ErrorKind::ServerError, "down"))
            })
            .await;

        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_miss() {
        let cache = RenderCache::new(Duration::ZERO);
        cache.insert("/rooms", &[CacheTag::ROOMS], &ActionResponse::success(json!([])));

        assert!(cache.get("/rooms").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_revalidate_tag_drops_only_tagged_entries() {
        let cache = RenderCache::new(Duration::from_secs(60));
        let ok = ActionResponse::success(json!({}));
        cache.insert("/posts", &[CacheTag::POSTS], &ok);
        cache.insert(
            "/posts/slug/open-day",
            &[CacheTag::POSTS, CacheTag::post("open-day")],
            &ok,
        );
        cache.insert("/banners", &[CacheTag::BANNERS], &ok);

        assert_eq!(cache.revalidate_tag(&CacheTag::post("open-day")), 1);
        assert_eq!(cache.revalidate_tag(&CacheTag::POSTS), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("/banners").is_some());
    }

    #[test]
    fn test_insert_sweeps_expired_keys() {
        let cache = RenderCache::new(Duration::from_millis(1));
        let ok = ActionResponse::success(json!([]));
        for i in 0..500 {
            cache.insert(&format!("/doctors?x={}", i), &[CacheTag::DOCTORS], &ok);
        }
        std::thread::sleep(Duration::from_millis(5));

        cache.insert("/doctors?x=fresh", &[CacheTag::DOCTORS], &ok);

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_is_bounded() {
        let cache = RenderCache::new(Duration::from_secs(60));
        let ok = ActionResponse::success(json!([]));
        for i in 0..MAX_ENTRIES + 50 {
            cache.insert(&format!("/doctors?x={}", i), &[CacheTag::DOCTORS], &ok);
        }

        assert_eq!(cache.len(), MAX_ENTRIES);
        assert!(cache.get(&format!("/doctors?x={}", MAX_ENTRIES + 49)).is_some());
    }
}
