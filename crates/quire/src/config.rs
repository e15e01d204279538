//! `quire.toml` configuration.

use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use quire_catalog::{Author, AuthorRegistry, LoadErrorPolicy, PipelineConfig, RouteConfig};
use quire_static::SiteMeta;

/// Configuration file structure (quire.toml).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub content: ContentConfig,
    pub catalog: CatalogConfig,
    pub routes: RouteConfig,
    pub build: BuildSettings,
    pub authors: BTreeMap<String, AuthorEntry>,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub base_url: String,
    pub output: PathBuf,
    /// Write each article's Markdown source next to its page
    pub export_sources: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            base_url: "/".to_string(),
            output: PathBuf::from("dist"),
            export_sources: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub dir: PathBuf,
    pub extensions: Vec<String>,
    pub include_drafts: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("content"),
            extensions: PipelineConfig::default().extensions,
            include_drafts: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub page_size: NonZeroUsize,
    pub fallback_author: String,
    pub on_load_error: LoadErrorPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: PipelineConfig::default().page_size,
            fallback_author: "staff".to_string(),
            on_load_error: LoadErrorPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct BuildSettings {
    /// Worker threads for loading and parsing (0 = one per core)
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorEntry {
    pub name: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl Config {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the config file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config = Self::parse(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            tracing::info!("Loaded config from {}", path.display());
            config
        } else {
            tracing::debug!("{} not found, using defaults", path.display());
            Self::default()
        };

        config.root = root;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.content.dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.site.output)
    }

    /// Registered authors. The fallback author is always present, named
    /// after its own id unless it has an `[authors.<id>]` entry.
    pub fn author_registry(&self) -> AuthorRegistry {
        let fallback_id = self.catalog.fallback_author.as_str();
        let fallback = self
            .authors
            .get(fallback_id)
            .map(|entry| entry.to_author(fallback_id))
            .unwrap_or_else(|| Author::new(fallback_id, capitalize(fallback_id)));

        let mut registry = AuthorRegistry::new(fallback);
        for (id, entry) in &self.authors {
            registry.register(entry.to_author(id));
        }
        registry
    }

    /// Pipeline settings, with an optional worker count override.
    pub fn pipeline_config(&self, workers: Option<usize>) -> PipelineConfig {
        PipelineConfig {
            extensions: self.content.extensions.clone(),
            workers: workers.unwrap_or(self.build.workers),
            page_size: self.catalog.page_size,
            on_load_error: self.catalog.on_load_error,
            include_drafts: self.content.include_drafts,
            routes: self.routes.clone(),
        }
    }

    pub fn site_meta(&self) -> SiteMeta {
        SiteMeta {
            title: self.site.title.clone(),
            base_url: self.site.base_url.clone(),
        }
    }
}

impl AuthorEntry {
    fn to_author(&self, id: &str) -> Author {
        Author {
            id: id.to_string(),
            display_name: self.name.clone(),
            bio: self.bio.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
