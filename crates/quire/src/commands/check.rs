//! Validate content without writing anything.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;

use crate::config::Config;

/// Run the check command.
pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    tracing::info!("Checking {}", config.content_dir().display());

    let publication = super::published(super::run_pipeline(&config, None).await?)?;

    let affected: BTreeSet<&Path> = publication.warnings.iter().map(|w| w.path()).collect();
    if !affected.is_empty() {
        tracing::warn!("Warnings in {} file(s)", affected.len());
    }

    tracing::info!(
        "{} documents, {} tags, {} authors, {} routes, {} warning(s)",
        publication.catalog.len(),
        publication.catalog.tags().count(),
        publication.catalog.authors().count(),
        publication.routes.len(),
        publication.warnings.len()
    );

    Ok(())
}
