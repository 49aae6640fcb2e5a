// Script filter data sources.
// Documentation indexes from devdocs.io and repository lists from GitHub.

pub mod docs;
pub mod repos;

pub use docs::{DEVDOCS_BASE, DocEntry, DocIndex, DocsSource};
pub use repos::{GITHUB_API_BASE, Repository, list_repositories};
