//! # Response Cache
//!
//! In-memory cache for serialized handler responses with
//! stale-while-revalidate semantics:
//!
//! - a fresh entry is served as-is
//! - an expired entry is served immediately when `swr` is enabled, while a
//!   background task refreshes it
//! - a miss runs the handler inline; only successful results are stored
//!
//! Handlers are wrapped explicitly with [`cached`]:
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use bytes::Bytes;
//! # use npmx_server::cache::{cached, CacheOptions, ResponseCache};
//! # async fn example() -> npmx_server::AppResult<()> {
//! let cache = Arc::new(ResponseCache::new(1000, CacheOptions::default()));
//! let (entry, status) = cached(&cache, "files:v2:react/v/18.2.0".to_string(), || async {
//!     Ok(Bytes::from_static(b"{}"))
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::constants::CACHE_MAX_AGE_ONE_YEAR;
use crate::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    pub max_age: Duration,
    pub swr: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(CACHE_MAX_AGE_ONE_YEAR),
            swr: true,
        }
    }
}

impl CacheOptions {
    /// `Cache-Control` value advertised alongside cached responses.
    pub fn cache_control(&self) -> String {
        let max_age = self.max_age.as_secs();
        if self.swr {
            format!("public, max-age={max_age}, s-maxage={max_age}, stale-while-revalidate")
        } else {
            format!("public, max-age={max_age}, s-maxage={max_age}")
        }
    }
}

/// A stored response body.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub body: Bytes,
    /// Quoted SHA-1 of the body.
    pub etag: String,
    pub last_modified: DateTime<Utc>,
    stored_at: Instant,
}

impl CachedResponse {
    fn new(body: Bytes) -> Self {
        let etag = format!("\"{}\"", crate::sha1_hash(&body));
        Self {
            body,
            etag,
            last_modified: Utc::now(),
            stored_at: Instant::now(),
        }
    }

    fn is_expired(&self, max_age: Duration) -> bool {
        self.stored_at.elapsed() >= max_age
    }
}

impl CachedResponse {
    fn matches(&self, request_headers: &HeaderMap) -> bool {
        request_headers
            .get_all(header::IF_NONE_MATCH)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .any(|tag| tag == "*" || tag == self.etag || tag.strip_prefix("W/") == Some(self.etag.as_str()))
    }

    /// Build the HTTP response for a JSON body, answering conditional
    /// requests with `304 Not Modified`.
    pub fn to_json_response(
        &self,
        status: CacheStatus,
        options: &CacheOptions,
        request_headers: &HeaderMap,
    ) -> Response {
        let mut headers = HeaderMap::new();
        let header_value = |value: String| {
            HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static(""))
        };
        headers.insert(header::CACHE_CONTROL, header_value(options.cache_control()));
        headers.insert(header::ETAG, header_value(self.etag.clone()));
        headers.insert(
            header::LAST_MODIFIED,
            header_value(
                self.last_modified
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string(),
            ),
        );
        headers.insert("x-cache", HeaderValue::from_static(status.as_str()));

        if self.matches(request_headers) {
            return (StatusCode::NOT_MODIFIED, headers).into_response();
        }

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        (StatusCode::OK, headers, self.body.clone()).into_response()
    }
}

/// How a request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Stale,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Stale => "STALE",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Bounded LRU store of serialized responses.
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CachedResponse>>,
    revalidating: Mutex<HashSet<String>>,
    options: CacheOptions,
}

impl ResponseCache {
    pub fn new(capacity: usize, options: CacheOptions) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            revalidating: Mutex::new(HashSet::new()),
            options,
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, body: Bytes) -> CachedResponse {
        let entry = CachedResponse::new(body);
        self.entries.lock().put(key, entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns false when a refresh for `key` is already running.
    fn begin_revalidation(&self, key: &str) -> bool {
        self.revalidating.lock().insert(key.to_string())
    }

    fn end_revalidation(&self, key: &str) {
        self.revalidating.lock().remove(key);
    }
}

/// Serve `key` from the cache, running `fetch` on a miss.
///
/// Concurrent misses for the same key each run `fetch`; only background
/// refreshes of stale entries are de-duplicated.
pub async fn cached<F, Fut>(
    cache: &Arc<ResponseCache>,
    key: String,
    fetch: F,
) -> AppResult<(CachedResponse, CacheStatus)>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<Bytes>> + Send + 'static,
{
    let options = *cache.options();

    if let Some(entry) = cache.get(&key) {
        if !entry.is_expired(options.max_age) {
            debug!(key = %key, "Cache hit");
            return Ok((entry, CacheStatus::Hit));
        }

        if options.swr {
            if cache.begin_revalidation(&key) {
                debug!(key = %key, "Serving stale entry, revalidating in background");
                let cache = Arc::clone(cache);
                tokio::spawn(async move {
                    match fetch().await {
                        Ok(body) => {
                            cache.insert(key.clone(), body);
                            debug!(key = %key, "Background revalidation stored");
                        }
                        Err(e) => {
                            warn!(key = %key, error = %e, "Background revalidation failed, keeping stale entry");
                        }
                    }
                    cache.end_revalidation(&key);
                });
            }
            return Ok((entry, CacheStatus::Stale));
        }
    }

    debug!(key = %key, "Cache miss");
    let body = fetch().await?;
    Ok((cache.insert(key, body), CacheStatus::Miss))
}
