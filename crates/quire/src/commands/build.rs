//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quire_catalog::RouteResolver;
use quire_static::{SiteWriter, TemplateRenderer};

use crate::config::Config;

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, workers: Option<usize>) -> Result<()> {
    tracing::info!("Building static site...");

    let config = Config::load(config_path)?;
    let publication = super::published(super::run_pipeline(&config, workers).await?)?;

    if !publication.warnings.is_empty() {
        tracing::warn!("{} document(s) had warnings", publication.warnings.len());
    }

    let output_dir = output.unwrap_or_else(|| config.output_dir());
    let renderer = TemplateRenderer::new(config.site_meta())?;
    let writer = SiteWriter::new(
        renderer,
        RouteResolver::new(config.routes.clone()),
        output_dir,
        config.site.base_url.clone(),
    )
    .export_sources(config.site.export_sources);

    let summary = tokio::task::spawn_blocking(move || {
        writer.write(&publication.catalog, &publication.routes)
    })
    .await?
    .context("Failed to write site")?;

    tracing::info!("Built {} pages in {}ms", summary.pages, summary.duration_ms);
    tracing::info!("Output: {}", summary.output_dir.display());

    Ok(())
}
