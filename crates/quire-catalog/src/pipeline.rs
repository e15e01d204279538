//! Publication pipeline: load, parse, normalize, index, validate.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use quire_mdx::{ParseError, ParsedDoc};

use crate::authors::AuthorRegistry;
use crate::cancel::CancellationToken;
use crate::catalog::{Catalog, IndexConfig, IndexError};
use crate::loader::{Loader, RawSource};
use crate::normalize::{NormalizeError, NormalizeWarning, Normalized, Normalizer};
use crate::routes::{RouteConfig, RouteConflict, RouteResolver, RouteTable};
use crate::source::{DocumentSource, LoadError, SourceError};

/// What to do with a source file that cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadErrorPolicy {
    /// Leave the file out and record a warning
    #[default]
    Skip,

    /// Fail the build
    Fail,
}

/// Pipeline settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Recognized content file extensions
    pub extensions: Vec<String>,

    /// Threads for loading and parsing (0 = one per core)
    pub workers: usize,

    /// Documents per listing page
    pub page_size: NonZeroUsize,

    pub on_load_error: LoadErrorPolicy,

    /// Publish documents marked `draft: true`
    pub include_drafts: bool,

    pub routes: RouteConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string(), "mdx".to_string()],
            workers: 0,
            page_size: IndexConfig::default().page_size,
            on_load_error: LoadErrorPolicy::default(),
            include_drafts: false,
            routes: RouteConfig::default(),
        }
    }
}

/// Pipeline states, in the order a successful run passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Loading,
    Parsing,
    Normalizing,
    Indexing,
    Validating,
    Published,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Parsing => "parsing",
            Self::Normalizing => "normalizing",
            Self::Indexing => "indexing",
            Self::Validating => "validating",
            Self::Published => "published",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A problem with one document that did not stop the build.
#[derive(Debug, thiserror::Error)]
pub enum Warning {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Excluded {}: {error}", path.display())]
    Parse { path: PathBuf, error: ParseError },

    #[error("Excluded document: {0}")]
    Normalize(NormalizeError),

    #[error(transparent)]
    Author(#[from] NormalizeWarning),
}

impl Warning {
    /// Source path the warning is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::Load(e) => e.path(),
            Self::Parse { path, .. } => path,
            Self::Normalize(NormalizeError::EmptySlug { path }) => path,
            Self::Normalize(NormalizeError::DuplicateSlug { second, .. }) => second,
            Self::Author(w) => w.path(),
        }
    }
}

/// An error that prevents the catalog from being published.
#[derive(Debug, thiserror::Error)]
pub enum StructuralError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Load(LoadError),

    #[error(transparent)]
    Normalize(NormalizeError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Route(#[from] RouteConflict),

    #[error("No documents left to publish")]
    NoDocuments,

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("Build cancelled")]
    Cancelled,
}

impl StructuralError {
    pub fn is_duplicate_slug(&self) -> bool {
        matches!(
            self,
            Self::Normalize(NormalizeError::DuplicateSlug { .. })
                | Self::Index(IndexError::DuplicateSlug { .. })
        )
    }
}

/// A successful run.
#[derive(Debug)]
pub struct Publication {
    pub catalog: Arc<Catalog>,
    pub routes: Arc<RouteTable>,
    pub warnings: Vec<Warning>,
}

/// A run that published nothing.
#[derive(Debug)]
pub struct Failure {
    /// Stage the run was in when it failed
    pub stage: Stage,
    pub errors: Vec<StructuralError>,
    pub warnings: Vec<Warning>,
}

/// Terminal result of a pipeline run.
#[derive(Debug)]
pub enum PipelineOutcome {
    Published(Publication),
    Failed(Failure),
}

impl PipelineOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }

    /// The published catalog, if the run succeeded.
    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            Self::Published(p) => Some(&p.catalog),
            Self::Failed(_) => None,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            Self::Published(p) => &p.warnings,
            Self::Failed(f) => &f.warnings,
        }
    }

    /// Structural errors; empty for a published run.
    pub fn errors(&self) -> &[StructuralError] {
        match self {
            Self::Published(_) => &[],
            Self::Failed(f) => &f.errors,
        }
    }
}

type StageResult<T> = Result<T, Vec<StructuralError>>;

fn fatal(error: impl Into<StructuralError>) -> Vec<StructuralError> {
    vec![error.into()]
}

/// Runs the publication stages over a [`DocumentSource`].
///
/// Every call to [`Pipeline::run`] starts from [`Stage::Idle`] and rebuilds
/// the catalog from the full source; nothing carries over between runs.
pub struct Pipeline<S> {
    source: S,
    authors: AuthorRegistry,
    config: PipelineConfig,
    stage: Stage,
}

impl<S: DocumentSource> Pipeline<S> {
    pub fn new(source: S, authors: AuthorRegistry, config: PipelineConfig) -> Self {
        Self {
            source,
            authors,
            config,
            stage: Stage::Idle,
        }
    }

    /// Current (or, after a run, final) stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source, for changing content between runs.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage and report the outcome.
    pub fn run(&mut self, cancel: &CancellationToken) -> PipelineOutcome {
        let start = Instant::now();
        self.stage = Stage::Idle;
        let mut warnings = Vec::new();

        match self.execute(cancel, &mut warnings) {
            Ok((catalog, routes)) => {
                self.stage = Stage::Published;
                tracing::info!(
                    "Published {} documents, {} routes ({} warnings) in {}ms",
                    catalog.len(),
                    routes.len(),
                    warnings.len(),
                    start.elapsed().as_millis()
                );
                PipelineOutcome::Published(Publication {
                    catalog: Arc::new(catalog),
                    routes: Arc::new(routes),
                    warnings,
                })
            }
            Err(errors) => {
                let stage = self.stage;
                self.stage = Stage::Failed;
                for error in &errors {
                    tracing::error!("{}", error);
                }
                tracing::error!("Build failed while {} with {} error(s)", stage, errors.len());
                PipelineOutcome::Failed(Failure {
                    stage,
                    errors,
                    warnings,
                })
            }
        }
    }

    fn enter(&mut self, stage: Stage, cancel: &CancellationToken) -> StageResult<()> {
        if cancel.is_cancelled() {
            tracing::warn!("Cancelled before {}", stage);
            return Err(fatal(StructuralError::Cancelled));
        }
        tracing::debug!("{} -> {}", self.stage, stage);
        self.stage = stage;
        Ok(())
    }

    fn execute(
        &mut self,
        cancel: &CancellationToken,
        warnings: &mut Vec<Warning>,
    ) -> StageResult<(Catalog, RouteTable)> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .thread_name(|i| format!("quire-worker-{i}"))
            .build()
            .map_err(|e| fatal(StructuralError::WorkerPool(e.to_string())))?;

        self.enter(Stage::Loading, cancel)?;
        let sources = self.load(&pool, warnings)?;

        self.enter(Stage::Parsing, cancel)?;
        let parsed = self.parse(&pool, sources, warnings);

        self.enter(Stage::Normalizing, cancel)?;
        let documents = self.normalize(parsed, warnings)?;

        self.enter(Stage::Indexing, cancel)?;
        let index_config = IndexConfig {
            page_size: self.config.page_size,
        };
        let catalog = Catalog::build(documents, &index_config, &self.authors).map_err(fatal)?;

        self.enter(Stage::Validating, cancel)?;
        let routes = RouteResolver::new(self.config.routes.clone())
            .route_table(&catalog)
            .map_err(fatal)?;

        if cancel.is_cancelled() {
            return Err(fatal(StructuralError::Cancelled));
        }

        Ok((catalog, routes))
    }

    fn load(
        &self,
        pool: &rayon::ThreadPool,
        warnings: &mut Vec<Warning>,
    ) -> StageResult<Vec<RawSource>> {
        let loader = Loader::new(&self.source, &self.config.extensions);
        let loaded = loader.load_all(pool).map_err(fatal)?;

        let mut sources = Vec::with_capacity(loaded.len());
        let mut failures = Vec::new();
        for result in loaded {
            match result {
                Ok(source) => sources.push(source),
                Err(err) => failures.push(err),
            }
        }

        tracing::info!(
            "Loaded {} sources from {}",
            sources.len(),
            self.source.describe()
        );

        if failures.is_empty() {
            return Ok(sources);
        }

        match self.config.on_load_error {
            LoadErrorPolicy::Fail => Err(failures.into_iter().map(StructuralError::Load).collect()),
            LoadErrorPolicy::Skip => {
                for err in failures {
                    tracing::warn!("{}", err);
                    warnings.push(Warning::Load(err));
                }
                Ok(sources)
            }
        }
    }

    fn parse(
        &self,
        pool: &rayon::ThreadPool,
        sources: Vec<RawSource>,
        warnings: &mut Vec<Warning>,
    ) -> Vec<(PathBuf, ParsedDoc)> {
        let mut results: Vec<(PathBuf, Result<ParsedDoc, ParseError>)> = pool.install(|| {
            sources
                .into_par_iter()
                .map(|source| {
                    let parsed = quire_mdx::parse(&source.raw_text);
                    (source.path, parsed)
                })
                .collect()
        });
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let mut parsed = Vec::with_capacity(results.len());
        for (path, result) in results {
            match result {
                Ok(doc) if doc.frontmatter.draft && !self.config.include_drafts => {
                    tracing::debug!("Skipping draft {}", path.display());
                }
                Ok(doc) => parsed.push((path, doc)),
                Err(error) => {
                    let warning = Warning::Parse { path, error };
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        parsed
    }

    fn normalize(
        &self,
        parsed: Vec<(PathBuf, ParsedDoc)>,
        warnings: &mut Vec<Warning>,
    ) -> StageResult<Vec<crate::model::Document>> {
        let mut normalizer = Normalizer::new(&self.authors);
        let mut documents = Vec::with_capacity(parsed.len());

        for (path, doc) in parsed {
            let (frontmatter, body) = doc.into_parts();
            match normalizer.normalize(&path, frontmatter, body) {
                Ok(Normalized {
                    document,
                    warnings: issues,
                }) => {
                    warnings.extend(issues.into_iter().map(Warning::Author));
                    documents.push(document);
                }
                Err(err) if err.is_structural() => {
                    return Err(fatal(StructuralError::Normalize(err)));
                }
                Err(err) => {
                    tracing::warn!("Excluded document: {}", err);
                    warnings.push(Warning::Normalize(err));
                }
            }
        }

        if documents.is_empty() {
            return Err(fatal(StructuralError::NoDocuments));
        }

        Ok(documents)
    }
}
