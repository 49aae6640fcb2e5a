//! Alfred script filters backed by a freshness-aware disk cache.
//!
//! Two filters share one core: a file cache whose entries expire per lookup,
//! and a page walker that follows `Link: rel="next"` headers and caches
//! every page it fetches.

pub mod alfred;
pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod sources;

pub use error::{FilterError, Result};
