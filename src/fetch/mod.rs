// HTTP fetching module.
// Provides the transport, Link header parsing, and the cached page walker.

pub mod client;
pub mod links;
pub mod paginate;

pub use client::{HttpResponse, HttpTransport, RateLimit, ReqwestTransport, header_map};
pub use links::{Relations, parse_link_header};
pub use paginate::{FetchOptions, PageResult, Paginator, next_page, page_key};
