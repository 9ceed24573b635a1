//! Artwork search over HTTP
//!
//! Cache first, then a HEAD request against the search endpoint (following
//! redirects to the concrete image), then a GET into the cache. Every
//! network problem is a warning and the card simply has no image.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use stratagem_core::config::ImageConfig;
use stratagem_core::{cache_key, search_query, Card, ImageCache, ImageProvider};

const USER_AGENT: &str = concat!("card_builder/", env!("CARGO_PKG_VERSION"));

/// Sleep-based minimum spacing between requests.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Blocks until `min_interval` has passed since the previous call.
    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

pub struct ImageSearcher {
    cache: ImageCache,
    client: Client,
    endpoint: String,
    width: u32,
    height: u32,
    limiter: RateLimiter,
    /// Cards whose lookup already failed this run, by cache key
    misses: HashSet<String>,
}

impl ImageSearcher {
    pub fn new(config: &ImageConfig) -> Result<Self> {
        let cache = ImageCache::new(&config.cache_dir);
        cache
            .ensure_dir()
            .with_context(|| format!("Failed to create image cache: {}", config.cache_dir.display()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            cache,
            client,
            endpoint: config.search_endpoint.clone(),
            width: config.width,
            height: config.height,
            limiter: RateLimiter::new(Duration::from_millis(config.min_interval_ms)),
            misses: HashSet::new(),
        })
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Endpoint with `{width}`/`{height}` filled in and the query appended.
    pub fn search_url(&self, query: &str) -> Result<Url> {
        let base = self
            .endpoint
            .replace("{width}", &self.width.to_string())
            .replace("{height}", &self.height.to_string());
        let mut url = Url::parse(&base).with_context(|| format!("Invalid search endpoint: {base}"))?;
        url.query_pairs_mut().append_key_only(query);
        Ok(url)
    }

    /// Cached artwork for `card`, searching and downloading it if needed.
    pub fn find(&mut self, card: &Card) -> Option<PathBuf> {
        let key = cache_key(card);
        if let Some(path) = self.cache.lookup(&key) {
            return Some(path);
        }
        if self.misses.contains(&key) {
            return None;
        }

        let query = search_query(card);
        if query.is_empty() {
            tracing::debug!(title = %card.title, "no search terms for card");
            self.misses.insert(key);
            return None;
        }

        match self.fetch(&key, &query) {
            Ok(path) => {
                tracing::info!(title = %card.title, path = %path.display(), "downloaded card image");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(title = %card.title, query = %query, "image search failed: {e:#}");
                self.misses.insert(key);
                None
            }
        }
    }

    fn fetch(&mut self, key: &str, query: &str) -> Result<PathBuf> {
        let url = self.search_url(query)?;

        self.limiter.wait();
        let head = self
            .client
            .head(url)
            .send()
            .context("search request failed")?
            .error_for_status()
            .context("search endpoint rejected the query")?;
        let image_url = head.url().clone();

        self.limiter.wait();
        let response = self
            .client
            .get(image_url.clone())
            .send()
            .with_context(|| format!("download failed: {image_url}"))?
            .error_for_status()
            .with_context(|| format!("download rejected: {image_url}"))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let Some(extension) = extension_for(content_type) else {
            anyhow::bail!("not an image ({content_type:?}): {image_url}");
        };
        let bytes = response.bytes().context("failed to read image body")?;

        let path = self.cache.path_for(key, extension);
        fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

impl ImageProvider for ImageSearcher {
    fn image_for(&mut self, card: &Card) -> Option<PathBuf> {
        self.find(card)
    }
}

/// Cache file extension for an `image/*` content type; `None` otherwise.
fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match mime.strip_prefix("image/")? {
        "png" => Some("png"),
        "webp" => Some("webp"),
        _ => Some("jpg"),
    }
}
