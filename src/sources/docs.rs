// Documentation index source.
// Fetches a devdocs.io index and keeps it in the cache for a week.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{FreshnessCache, FreshnessPolicy};
use crate::error::{FilterError, Result};
use crate::fetch::{HttpTransport, header_map};

pub const DEVDOCS_BASE: &str = "https://devdocs.io";

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/104.0.0.0 Safari/537.36";

/// Names accepted on input that devdocs publishes under another slug.
const DOC_ALIASES: &[(&str, &str)] = &[("web", "dom")];

/// One searchable entry of a documentation index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

/// `index.json` of one documentation set. Other top-level fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DocIndex {
    pub entries: Vec<DocEntry>,
}

/// Trim the configured doc name and apply aliases.
pub fn resolve_doc_name(raw: &str) -> String {
    let name = raw.trim();
    DOC_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, slug)| slug.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Identifier of a doc set, with the version suffix when one is given.
pub fn doc_id(doc: &str, version: Option<&str>) -> String {
    match version.map(str::trim).filter(|v| !v.is_empty()) {
        Some(version) => format!("{}~{}", doc, version),
        None => doc.to_string(),
    }
}

pub fn index_url(base_url: &str, doc_id: &str) -> String {
    format!("{}/docs/{}/index.json", base_url.trim_end_matches('/'), doc_id)
}

pub fn cache_key(doc_id: &str) -> String {
    format!("{}.data", doc_id)
}

pub fn request_headers() -> Result<HeaderMap> {
    header_map([("User-Agent", BROWSER_USER_AGENT.to_string())])
}

/// Reads documentation indexes through the cache.
pub struct DocsSource<'a, H> {
    transport: &'a H,
    cache: &'a FreshnessCache,
    base_url: String,
    policy: FreshnessPolicy,
    headers: HeaderMap,
}

impl<'a, H: HttpTransport> DocsSource<'a, H> {
    pub fn new(
        transport: &'a H,
        cache: &'a FreshnessCache,
        base_url: impl Into<String>,
        policy: FreshnessPolicy,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            cache,
            base_url: base_url.into(),
            policy,
            headers: request_headers()?,
        })
    }

    /// Entries of `doc_id`, from the cache when fresh.
    ///
    /// `refresh` skips the cache lookup; the result is still stored.
    pub async fn entries(&self, doc_id: &str, refresh: bool) -> Result<Vec<DocEntry>> {
        let url = index_url(&self.base_url, doc_id);
        let key = cache_key(doc_id);

        let producer = || self.fetch_index(&url);
        let payload = if refresh {
            self.cache.refresh(&key, producer).await?
        } else {
            self.cache.get_or_compute(&key, self.policy, producer).await?
        };

        let index: DocIndex =
            serde_json::from_slice(&payload).map_err(|e| FilterError::malformed(&key, e))?;
        debug!(doc_id, entries = index.entries.len(), "documentation index loaded");

        Ok(index.entries)
    }

    /// Download the index; only bodies that parse are handed to the cache.
    async fn fetch_index(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.transport.get(url, &self.headers).await?;
        response.json::<DocIndex>()?;
        Ok(response.body)
    }
}
