// Script filter runner.
// Resolves configuration, runs the selected source, and builds Alfred items.

use tracing::{error, info};

use crate::alfred::{Item, ScriptFilterOutput};
use crate::cache::FreshnessCache;
use crate::config::{Command, DocsConfig, ReposConfig};
use crate::error::Result;
use crate::fetch::{HttpTransport, ReqwestTransport};
use crate::sources::{DocsSource, list_repositories};

/// Run `command` against the real network and process environment.
pub async fn run(command: Command) -> Result<Vec<Item>> {
    let transport = ReqwestTransport::new()?;

    match command {
        Command::Docs(args) => {
            let config = DocsConfig::resolve(args, |name| std::env::var(name).ok())?;
            run_docs(&transport, &config).await
        }
        Command::Repos(args) => {
            let config = ReposConfig::resolve(args)?;
            run_repos(&transport, &config).await
        }
    }
}

pub async fn run_docs<H: HttpTransport>(transport: &H, config: &DocsConfig) -> Result<Vec<Item>> {
    let cache = FreshnessCache::new(&config.cache_dir);
    let source = DocsSource::new(transport, &cache, config.base_url.as_str(), config.policy)?;

    let entries = source.entries(&config.doc_id, config.refresh).await?;
    info!(doc_id = %config.doc_id, count = entries.len(), "documentation entries");

    Ok(entries.into_iter().map(Item::from).collect())
}

pub async fn run_repos<H: HttpTransport>(
    transport: &H,
    config: &ReposConfig,
) -> Result<Vec<Item>> {
    let cache = FreshnessCache::new(&config.cache_dir);

    let repos = list_repositories(
        transport,
        &cache,
        &config.api_base,
        &config.user,
        &config.token,
    )
    .await?;
    info!(user = %config.user, count = repos.len(), "repositories");

    Ok(repos.into_iter().map(Item::from).collect())
}

/// Wrap a run's outcome for Alfred; failures become a single error row.
pub fn render(result: Result<Vec<Item>>) -> ScriptFilterOutput {
    match result {
        Ok(items) => ScriptFilterOutput::new(items),
        Err(e) => {
            error!(error = %e, "script filter failed");
            ScriptFilterOutput::error(e.to_string())
        }
    }
}
