//! Query layer over actions: stale-time caching, retry policy and
//! invalidation after mutations.
//!
//! A `QueryClient` is constructed explicitly and passed to whoever needs it,
//! one per handled request or per long-lived client session.

use crate::config::Config;
use crate::models::response::{ActionResponse, ErrorKind};
use crate::models::Record;
use crate::services::adapter::{handle_action_result, ActionError, Fetched};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        QueryKey(vec![resource.into()])
    }

    pub fn with(mut self, part: impl Into<String>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn resource(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Only connectivity failures are retried; auth and not-found never are.
    pub fn should_retry(&self, failures: u32, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::ConnectionError => failures <= self.max_retries,
            ErrorKind::NotAuthenticated
            | ErrorKind::Forbidden
            | ErrorKind::NotFound
            | ErrorKind::ValidationError
            | ErrorKind::ServerError
            | ErrorKind::UnknownError => false,
        }
    }

    /// Delay before retry number `attempt` (0-based): `min(base * 2^attempt, max)`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Debug)]
struct CachedQuery {
    fetched: Fetched<Record>,
    updated_at: Instant,
    invalidated: bool,
}

#[derive(Debug)]
pub struct QueryClient {
    stale_time: Duration,
    retry: RetryPolicy,
    queries: Mutex<HashMap<QueryKey, CachedQuery>>,
}

impl QueryClient {
    pub fn new(stale_time: Duration, retry: RetryPolicy) -> Self {
        Self {
            stale_time,
            retry,
            queries: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.query_stale_time(), RetryPolicy::default())
    }

    pub async fn fetch_query<F, Fut>(
        &self,
        key: QueryKey,
        action: F,
    ) -> Result<Fetched<Record>, ActionError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ActionResponse<Record>>,
    {
        if let Some(fetched) = self.fresh(&key) {
            debug!("Query cache hit: {:?}", key);
            return Ok(fetched);
        }

        let mut failures = 0;
        loop {
            match handle_action_result(action()).await {
                Ok(fetched) => {
                    self.set_query_data(key, fetched.clone());
                    return Ok(fetched);
                }
                Err(error) => {
                    failures += 1;
                    if !self.retry.should_retry(failures, error.kind()) {
                        return Err(error);
                    }
                    let delay = self.retry.delay(failures - 1);
                    warn!(
                        "Query {:?} failed ({}), retry {}/{} in {:?}",
                        key, error, failures, self.retry.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    pub async fn mutate<T, Fut>(
        &self,
        action: Fut,
        invalidates: &[&str],
    ) -> Result<Fetched<T>, ActionError>
    where
        Fut: Future<Output = ActionResponse<T>>,
    {
        let fetched = handle_action_result(action).await?;
        for resource in invalidates {
            self.invalidate_queries(resource);
        }
        Ok(fetched)
    }

    pub fn invalidate_queries(&self, resource: &str) {
        for (key, query) in self.lock().iter_mut() {
            if key.resource() == resource {
                query.invalidated = true;
            }
        }
    }

    pub fn get_query_data(&self, key: &QueryKey) -> Option<Fetched<Record>> {
        self.lock().get(key).map(|query| query.fetched.clone())
    }

    pub fn set_query_data(&self, key: QueryKey, fetched: Fetched<Record>) {
        self.lock().insert(
            key,
            CachedQuery {
                fetched,
                updated_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    fn fresh(&self, key: &QueryKey) -> Option<Fetched<Record>> {
        self.lock()
            .get(key)
            .filter(|q| !q.invalidated && q.updated_at.elapsed() < self.stale_time)
            .map(|q| q.fetched.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<QueryKey, CachedQuery>> {
        self.queries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::response::ErrorDetails;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant_retry() -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::ZERO,
            ..RetryPolicy::default()
        }
    }

    fn failing(kind: ErrorKind) -> ActionResponse<Record> {
        ActionResponse::failure(ErrorDetails::new(kind, "failed"))
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(4), Duration::from_secs(16));
        assert_eq!(policy.delay(5), Duration::from_secs(30));
        assert_eq!(policy.delay(40), Duration::from_secs(30));
    }

    #[test]
    fn test_auth_and_not_found_are_never_retried() {
        let policy = RetryPolicy::default();
        for kind in [
            ErrorKind::NotAuthenticated,
            ErrorKind::Forbidden,
            ErrorKind::NotFound,
        ] {
            assert!(!policy.should_retry(1, kind));
        }
        assert!(policy.should_retry(1, ErrorKind::ConnectionError));
        assert!(policy.should_retry(2, ErrorKind::ConnectionError));
        assert!(!policy.should_retry(3, ErrorKind::ConnectionError));
    }

    #[tokio::test]
    async fn test_connection_errors_retry_twice_then_surface() {
        let client = QueryClient::new(Duration::from_secs(60), instant_retry());
        let calls = AtomicU32::new(0);

        let result = client
            .fetch_query(QueryKey::new("doctors"), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { failing(ErrorKind::ConnectionError) }
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::ConnectionError);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_recovers_after_transient_failure() {
        let client = QueryClient::new(Duration::from_secs(60), instant_retry());
        let calls = AtomicU32::new(0);

        let result = client
            .fetch_query(QueryKey::new("rooms"), || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        failing(ErrorKind::ConnectionError)
                    } else {
                        ActionResponse::success(json!([{ "id": 7 }]))
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result.data, json!([{ "id": 7 }]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let client = QueryClient::new(Duration::from_secs(60), instant_retry());
        let calls = AtomicU32::new(0);

        let result = client
            .fetch_query(QueryKey::new("posts").with("missing"), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { failing(ErrorKind::NotFound) }
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mutation_invalidates_resource_queries() {
        let client = QueryClient::new(Duration::from_secs(60), instant_retry());
        let calls = AtomicU32::new(0);
        let key = QueryKey::new("banners").with("/banners");
        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { ActionResponse::success(json!([])) }
        };

        client.fetch_query(key.clone(), fetch).await.unwrap();
        client.fetch_query(key.clone(), fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        client
            .mutate(async { ActionResponse::success(json!({ "id": 1 })) }, &["banners"])
            .await
            .unwrap();

        client.fetch_query(key, fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() {
        let client = QueryClient::new(Duration::from_secs(60), instant_retry());
        let key = QueryKey::new("rooms");
        client.set_query_data(
            key.clone(),
            Fetched {
                data: json!([]),
                meta: None,
            },
        );

        let result = client
            .mutate(async { failing(ErrorKind::ValidationError) }, &["rooms"])
            .await;

        assert!(result.is_err());
        assert!(client.fresh(&key).is_some());
    }
}
