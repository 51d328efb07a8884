use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{CACHE_CONTROL, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use url::Url;

use super::error::ApiError;
use super::query::{STORY_PATH, StoriesQuery};
use super::types::{StoriesResponse, StoryDetail};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Whether a stories request may be answered from the in-memory cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    #[default]
    Default,
    /// Always hit the network; also drops every cached page.
    NoStore,
}

struct CacheEntry<T> {
    data: T,
    fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

#[derive(Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base_url: Url,
    cache_ttl: Duration,
    page_cache: Arc<RwLock<HashMap<String, CacheEntry<StoriesResponse>>>>,
}

impl NewsClient {
    pub fn new(base_url: Url, timeout: Duration, cache_ttl: Duration) -> Result<Self, ApiError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{base_url} cannot be a base URL")));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            cache_ttl,
            page_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn clear_cache(&self) {
        self.page_cache.write().await.clear();
    }

    pub async fn fetch_stories(
        &self,
        query: &StoriesQuery,
        cache: CacheMode,
    ) -> Result<StoriesResponse, ApiError> {
        let path = query.path();

        match cache {
            CacheMode::Default if !self.cache_ttl.is_zero() => {
                let cached = self.page_cache.read().await;
                if let Some(entry) = cached.get(&path)
                    && entry.is_fresh(self.cache_ttl)
                {
                    tracing::debug!(%path, "serving stories from cache");
                    return Ok(entry.data.clone());
                }
            }
            CacheMode::Default => {}
            // Pages are offset-based, so a fresh page 1 shifts every later page.
            CacheMode::NoStore => self.clear_cache().await,
        }

        let url = self.base_url.join(&path)?;
        let mut request = self.http.get(url);
        if cache == CacheMode::NoStore {
            request = request.header(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }
        let response: StoriesResponse = self.send_json(&path, request).await?;

        if cache == CacheMode::Default && !self.cache_ttl.is_zero() {
            self.page_cache.write().await.insert(
                path,
                CacheEntry {
                    data: response.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }

        Ok(response)
    }

    pub async fn fetch_story_detail(&self, id: &str) -> Result<StoryDetail, ApiError> {
        let url = self.story_url(id)?;
        let path = url.path().to_string();
        self.send_json(&path, self.http.get(url)).await
    }

    fn story_url(&self, id: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(STORY_PATH)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?
            .push(id);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            tracing::warn!(%path, error = %e, "request failed to send");
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%path, status = status.as_u16(), "non-success response");
            return Err(ApiError::from_status(path, status.as_u16()));
        }

        let body = response.bytes().await?;
        tracing::debug!(%path, bytes = body.len(), elapsed = ?started.elapsed(), "response received");
        serde_json::from_slice(&body).map_err(|e| ApiError::Parse {
            path: path.to_string(),
            details: e.to_string(),
        })
    }
}
