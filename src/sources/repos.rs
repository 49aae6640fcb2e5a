// GitHub repository list source.
// Walks every page of a user's repositories, newest push first.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::cache::FreshnessCache;
use crate::error::Result;
use crate::fetch::{FetchOptions, HttpTransport, Paginator, header_map, page_key};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const GITHUB_USER_AGENT: &str = "alfred-filters";
const PER_PAGE: u32 = 100;

/// The fields of a GitHub repository the filter needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
}

/// First page of a user's repositories, most recently pushed first.
pub fn repos_url(api_base: &str, user: &str) -> String {
    format!(
        "{}/users/{}/repos?sort=pushed&per_page={}&page=1",
        api_base.trim_end_matches('/'),
        user,
        PER_PAGE
    )
}

pub fn request_headers(token: &str) -> Result<HeaderMap> {
    header_map([
        ("Authorization", format!("Bearer {}", token)),
        ("Accept", "application/vnd.github+json".to_string()),
        ("X-GitHub-Api-Version", GITHUB_API_VERSION.to_string()),
        ("User-Agent", GITHUB_USER_AGENT.to_string()),
    ])
}

/// Every repository of `user`. Page 1 is always refetched; later pages
/// come from the cache when present.
pub async fn list_repositories<H: HttpTransport>(
    transport: &H,
    cache: &FreshnessCache,
    api_base: &str,
    user: &str,
    token: &str,
) -> Result<Vec<Repository>> {
    let paginator = Paginator::new(transport, cache, request_headers(token)?);

    paginator
        .fetch_all(
            &repos_url(api_base, user),
            |page| page_key(user, page),
            &FetchOptions::default(),
        )
        .await
}
