//! Writes a rendered site to disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use quire_catalog::{Catalog, RoutePath, RouteResolver, RouteTable, RouteTarget};

use crate::export::export_frontmatter;
use crate::render::{PageRenderer, RenderError, Views};

/// Result of writing a site.
#[derive(Debug)]
pub struct WriteSummary {
    /// Number of HTML pages written
    pub pages: usize,

    /// Total write time in milliseconds
    pub duration_ms: u64,

    pub output_dir: PathBuf,
}

/// Errors that can occur while writing a site.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Failed to render {route}: {source}")]
    Render {
        route: RoutePath,
        #[source]
        source: RenderError,
    },

    #[error("No page for {target} at {route}")]
    Unresolved { route: RoutePath, target: RouteTarget },

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Failed to export frontmatter for {slug}: {source}")]
    Export {
        slug: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Serialize)]
struct Manifest<'a> {
    catalog: &'a Catalog,
    routes: &'a RouteTable,
}

/// Renders every route of a catalog and writes it below an output directory.
pub struct SiteWriter<R> {
    renderer: R,
    resolver: RouteResolver,
    output_dir: PathBuf,
    base_url: String,
    export_sources: bool,
}

impl<R: PageRenderer> SiteWriter<R> {
    pub fn new(
        renderer: R,
        resolver: RouteResolver,
        output_dir: impl Into<PathBuf>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            resolver,
            output_dir: output_dir.into(),
            base_url: base_url.into(),
            export_sources: false,
        }
    }

    /// Also write each article's frontmatter and body next to its page.
    pub fn export_sources(mut self, enabled: bool) -> Self {
        self.export_sources = enabled;
        self
    }

    /// Write one `index.html` per route plus `catalog.json`.
    pub fn write(&self, catalog: &Catalog, routes: &RouteTable) -> Result<WriteSummary, WriteError> {
        let start = Instant::now();

        fs::create_dir_all(&self.output_dir).map_err(|source| WriteError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let views = Views::new(catalog, &self.resolver, &self.base_url);
        let entries: Vec<(&RoutePath, &RouteTarget)> = routes.iter().collect();

        entries
            .par_iter()
            .map(|(route, target)| self.write_page(&views, route, target))
            .collect::<Result<Vec<()>, WriteError>>()?;

        if self.export_sources {
            self.write_sources(catalog)?;
        }

        self.write_manifest(catalog, routes)?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Wrote {} pages to {} in {}ms",
            entries.len(),
            self.output_dir.display(),
            duration_ms
        );

        Ok(WriteSummary {
            pages: entries.len(),
            duration_ms,
            output_dir: self.output_dir.clone(),
        })
    }

    fn write_page(
        &self,
        views: &Views<'_>,
        route: &RoutePath,
        target: &RouteTarget,
    ) -> Result<(), WriteError> {
        let view = views.view(target).ok_or_else(|| WriteError::Unresolved {
            route: route.clone(),
            target: target.clone(),
        })?;

        let html = self
            .renderer
            .render(&view)
            .map_err(|source| WriteError::Render {
                route: route.clone(),
                source,
            })?;

        write_file(&self.output_dir.join(route.to_file_path()), html)
    }

    fn write_sources(&self, catalog: &Catalog) -> Result<(), WriteError> {
        let documents: Vec<_> = catalog.documents().collect();
        documents.par_iter().try_for_each(|doc| {
            let source = export_frontmatter(doc).map_err(|source| WriteError::Export {
                slug: doc.slug.clone(),
                source,
            })?;
            let page = self.resolver.resolve(doc).to_file_path();
            write_file(&self.output_dir.join(page.with_file_name("index.md")), source)
        })
    }

    fn write_manifest(&self, catalog: &Catalog, routes: &RouteTable) -> Result<(), WriteError> {
        let json = serde_json::to_string_pretty(&Manifest { catalog, routes })?;
        write_file(&self.output_dir.join("catalog.json"), json)
    }
}

fn write_file(path: &Path, contents: String) -> Result<(), WriteError> {
    let io_error = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, contents).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{SiteMeta, TemplateRenderer};
    use quire_catalog::{
        AuthorRegistry, CancellationToken, MemorySource, Pipeline, PipelineConfig,
        PipelineOutcome, RouteConfig,
    };
    use tempfile::tempdir;

    fn publish() -> (std::sync::Arc<Catalog>, std::sync::Arc<RouteTable>) {
        let source = MemorySource::new()
            .with(
                "hello.md",
                "---\ntitle: Hello\ndate: 2024-01-01\ntags: [rust]\n---\n# Hello\n",
            )
            .with(
                "second.md",
                "---\ntitle: Second\ndate: 2024-02-01\n---\nMore.\n",
            );
        let mut pipeline =
            Pipeline::new(source, AuthorRegistry::default(), PipelineConfig::default());

        match pipeline.run(&CancellationToken::new()) {
            PipelineOutcome::Published(p) => (p.catalog, p.routes),
            PipelineOutcome::Failed(f) => panic!("build failed: {:?}", f.errors),
        }
    }

    fn writer(out: &Path) -> SiteWriter<TemplateRenderer> {
        SiteWriter::new(
            TemplateRenderer::new(SiteMeta::default()).unwrap(),
            RouteResolver::new(RouteConfig::default()),
            out,
            "/",
        )
    }

    #[test]
    fn writes_every_route() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("dist");
        let (catalog, routes) = publish();

        let summary = writer(&out).write(&catalog, &routes).unwrap();

        assert_eq!(summary.pages, routes.len());
        for (route, _) in routes.iter() {
            assert!(out.join(route.to_file_path()).exists(), "missing {route}");
        }
        let article = fs::read_to_string(out.join("blog/hello/index.html")).unwrap();
        assert!(article.contains("<h1>Hello</h1>"));
        assert!(out.join("tags/rust/index.html").exists());
        assert!(out.join("index.html").exists());
    }

    #[test]
    fn writes_manifest() {
        let temp = tempdir().unwrap();
        let (catalog, routes) = publish();

        writer(temp.path()).write(&catalog, &routes).unwrap();

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(temp.path().join("catalog.json")).unwrap())
                .unwrap();
        assert_eq!(
            manifest["catalog"]["chronological"],
            serde_json::json!(["second", "hello"])
        );
        assert_eq!(manifest["routes"]["/blog/hello/"]["kind"], "article");
    }

    #[test]
    fn exports_sources_when_enabled() {
        let temp = tempdir().unwrap();
        let (catalog, routes) = publish();

        writer(temp.path())
            .export_sources(true)
            .write(&catalog, &routes)
            .unwrap();

        let exported = fs::read_to_string(temp.path().join("blog/hello/index.md")).unwrap();
        let parsed = quire_mdx::parse(&exported).unwrap();
        assert_eq!(parsed.frontmatter.title, "Hello");
        assert_eq!(parsed.frontmatter.tags, vec!["rust".to_string()]);
    }
}
