// Command-line and environment configuration.
// Alfred passes workflow variables as environment variables; clap reads them
// and the entry point resolves everything once into plain config structs.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::cache::{FreshnessPolicy, resolve_dir};
use crate::error::{FilterError, Result};
use crate::logging::LogLevel;
use crate::sources::docs::{doc_id, resolve_doc_name};
use crate::sources::{DEVDOCS_BASE, GITHUB_API_BASE};

/// Alfred script filters for devdocs.io and GitHub
#[derive(Parser, Debug)]
#[command(name = "alfred-filters")]
#[command(version, about)]
pub struct Cli {
    /// Verbosity of diagnostics written to stderr
    #[arg(long, value_enum, env = "ALFRED_FILTERS_LOG", default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the entries of a devdocs.io documentation set
    Docs(DocsArgs),
    /// List every repository of a GitHub user
    Repos(ReposArgs),
}

#[derive(Args, Debug)]
pub struct DocsArgs {
    /// Documentation set, e.g. `python` or `web`
    #[arg(long, env = "doc")]
    pub doc: Option<String>,

    /// Version suffix; defaults to the `<doc>_version` variable
    #[arg(long)]
    pub doc_version: Option<String>,

    /// Directory holding cached indexes
    #[arg(long, env = "alfred_workflow_data")]
    pub data_dir: Option<PathBuf>,

    /// Days before a cached index is downloaded again
    #[arg(long, default_value_t = 7)]
    pub max_age_days: u64,

    /// Ignore the cached index and download it again
    #[arg(long)]
    pub refresh: bool,

    #[arg(long, default_value = DEVDOCS_BASE, hide = true)]
    pub base_url: String,
}

#[derive(Args, Debug)]
pub struct ReposArgs {
    /// GitHub account whose repositories are listed
    #[arg(long, env = "GITHUB_USER")]
    pub user: Option<String>,

    /// Personal access token
    #[arg(long, env = "GITHUB_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory holding cached pages
    #[arg(long, env = "alfred_workflow_cache")]
    pub cache_dir: Option<PathBuf>,

    #[arg(long, default_value = GITHUB_API_BASE, hide = true)]
    pub api_base: String,
}

/// Resolved settings for the `docs` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsConfig {
    pub doc_id: String,
    pub cache_dir: PathBuf,
    pub policy: FreshnessPolicy,
    pub refresh: bool,
    pub base_url: String,
}

impl DocsConfig {
    /// Resolve `args`, looking up `<doc>_version` through `env` when no
    /// version flag is given.
    pub fn resolve(args: DocsArgs, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let doc = non_empty(args.doc)
            .map(|doc| resolve_doc_name(&doc))
            .filter(|doc| !doc.is_empty())
            .ok_or(FilterError::MissingConfig("doc"))?;

        let version = non_empty(args.doc_version).or_else(|| env(&format!("{}_version", doc)));

        Ok(Self {
            doc_id: doc_id(&doc, version.as_deref()),
            cache_dir: resolve_dir(args.data_dir),
            policy: FreshnessPolicy::ttl(Duration::from_secs(
                args.max_age_days.saturating_mul(24 * 60 * 60),
            )),
            refresh: args.refresh,
            base_url: args.base_url,
        })
    }
}

/// Resolved settings for the `repos` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReposConfig {
    pub user: String,
    pub token: String,
    pub cache_dir: PathBuf,
    pub api_base: String,
}

impl ReposConfig {
    pub fn resolve(args: ReposArgs) -> Result<Self> {
        let (Some(user), Some(token)) = (non_empty(args.user), non_empty(args.token)) else {
            return Err(FilterError::MissingConfig("GITHUB_API_TOKEN and GITHUB_USER"));
        };

        Ok(Self {
            user,
            token,
            cache_dir: resolve_dir(args.cache_dir),
            api_base: args.api_base,
        })
    }
}

/// Alfred sets unconfigured workflow variables to empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
