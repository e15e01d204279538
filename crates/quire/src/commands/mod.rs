//! CLI subcommands.

pub mod build;
pub mod check;
pub mod init;

use anyhow::{bail, Result};
use quire_catalog::{
    CancellationToken, FsSource, Pipeline, PipelineOutcome, Publication, StructuralError,
};

use crate::config::Config;

/// Run the pipeline on a blocking thread. Ctrl-C cancels it at the next
/// stage boundary.
pub async fn run_pipeline(config: &Config, workers: Option<usize>) -> Result<PipelineOutcome> {
    let source = FsSource::new(config.content_dir());
    let mut pipeline = Pipeline::new(
        source,
        config.author_registry(),
        config.pipeline_config(workers),
    );

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let mut handle = tokio::task::spawn_blocking(move || pipeline.run(&token));

    let outcome = tokio::select! {
        joined = &mut handle => joined?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, stopping after the current stage");
            cancel.cancel();
            handle.await?
        }
    };

    Ok(outcome)
}

/// Unwrap a publication, turning a failed run into an error.
pub fn published(outcome: PipelineOutcome) -> Result<Publication> {
    match outcome {
        PipelineOutcome::Published(publication) => Ok(publication),
        PipelineOutcome::Failed(failure) => {
            if matches!(failure.errors[..], [StructuralError::Cancelled]) {
                bail!("Build cancelled");
            }
            bail!(
                "Build failed while {} with {} error(s)",
                failure.stage,
                failure.errors.len()
            )
        }
    }
}
