// Cache module for local filesystem caching.
// Stores HTTP responses on disk with per-lookup freshness checks.

pub mod paths;
pub mod store;

pub use paths::{default_cache_dir, resolve_dir};
pub use store::{CacheEntry, DOCS_TTL, FreshnessCache, FreshnessPolicy};
