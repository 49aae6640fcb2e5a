// Paginated fetching.
// Walks `next` links page by page, caching every page under its own key.

use std::collections::HashSet;

use reqwest::header::{HeaderMap, LINK};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::cache::{FreshnessCache, FreshnessPolicy};
use crate::error::{FilterError, Result};

use super::client::HttpTransport;
use super::links::{NEXT, Relations, parse_link_header};

/// One page of a collection plus the links it advertises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub relations: Relations,
}

/// Per-walk options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Always hit the network for page 1 so new content shows up.
    pub refresh_first_page: bool,
    /// Freshness applied to every cached page that is not refreshed.
    pub policy: FreshnessPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            refresh_first_page: true,
            policy: FreshnessPolicy::forever(),
        }
    }
}

/// Cache key for page `page` of `namespace`.
pub fn page_key(namespace: &str, page: u32) -> String {
    format!("{}-{}.json", namespace, page)
}

/// Decide which URL to fetch after `current`.
///
/// Returns `None` when there is no `next` link, when `next` points back at
/// `current`, or when it points at a page already fetched in this walk.
pub fn next_page<'a>(
    current: &str,
    relations: &'a Relations,
    visited: &HashSet<String>,
) -> Option<&'a str> {
    let next = relations.get(NEXT)?.as_str();

    if next == current {
        warn!(url = current, "next link points at the current page");
        return None;
    }
    if visited.contains(next) {
        warn!(url = next, "next link points at an already fetched page");
        return None;
    }

    Some(next)
}

/// In-memory state of one walk. Dropped when the walk ends.
struct FetchSession<T> {
    url: String,
    page: u32,
    items: Vec<T>,
    visited: HashSet<String>,
}

impl<T> FetchSession<T> {
    fn new(start_url: &str) -> Self {
        Self {
            url: start_url.to_string(),
            page: 1,
            items: Vec::new(),
            visited: HashSet::from([start_url.to_string()]),
        }
    }

    fn advance(&mut self, url: String) {
        self.visited.insert(url.clone());
        self.url = url;
        self.page += 1;
    }
}

/// Fetches every page of a collection through the cache.
pub struct Paginator<'a, H> {
    transport: &'a H,
    cache: &'a FreshnessCache,
    headers: HeaderMap,
}

impl<'a, H: HttpTransport> Paginator<'a, H> {
    pub fn new(transport: &'a H, cache: &'a FreshnessCache, headers: HeaderMap) -> Self {
        Self {
            transport,
            cache,
            headers,
        }
    }

    /// Fetch all pages starting at `start_url` and return their items in order.
    ///
    /// Any failure aborts the walk and nothing fetched so far is returned.
    /// Items are passed through as served, duplicates included.
    pub async fn fetch_all<T, K>(
        &self,
        start_url: &str,
        page_key: K,
        options: &FetchOptions,
    ) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
        K: Fn(u32) -> String,
    {
        let mut session = FetchSession::new(start_url);

        loop {
            let key = page_key(session.page);
            let bypass = session.page == 1 && options.refresh_first_page;
            let page: PageResult<T> = self
                .load_page(&session.url, &key, bypass, options.policy)
                .await?;

            let next = next_page(&session.url, &page.relations, &session.visited)
                .map(str::to_string);
            debug!(
                page = session.page,
                items = page.items.len(),
                next = next.as_deref(),
                "page loaded"
            );
            session.items.extend(page.items);

            match next {
                Some(url) => session.advance(url),
                None => break,
            }
        }

        Ok(session.items)
    }

    async fn load_page<T>(
        &self,
        url: &str,
        key: &str,
        bypass: bool,
        policy: FreshnessPolicy,
    ) -> Result<PageResult<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let producer = || self.fetch_page::<T>(url);
        let payload = if bypass {
            self.cache.refresh(key, producer).await?
        } else {
            self.cache.get_or_compute(key, policy, producer).await?
        };

        serde_json::from_slice(&payload).map_err(|e| FilterError::malformed(key, e))
    }

    /// Fetch one page from the network and serialize it for the cache.
    async fn fetch_page<T>(&self, url: &str) -> Result<Vec<u8>>
    where
        T: Serialize + DeserializeOwned,
    {
        let response = self.transport.get(url, &self.headers).await?;
        let relations = parse_link_header(response.header(LINK.as_str()));
        let items: Vec<T> = response.json()?;

        serde_json::to_vec(&PageResult { items, relations })
            .map_err(|e| FilterError::malformed(url, e))
    }
}
