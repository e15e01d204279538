//! Mapping of catalog entries to public URL paths.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Page};
use crate::model::Document;
use crate::slug::url_segment;

/// A public URL path, always starting and ending with `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RoutePath(String);

impl RoutePath {
    /// Builds `/<prefix>/<key>/.../`. The configured prefix may be empty or
    /// nested; each key must be a single non-empty segment.
    fn under<'s>(prefix: &str, keys: impl IntoIterator<Item = &'s str>) -> Self {
        let mut path = String::from("/");
        for segment in prefix.split('/').filter(|s| !s.is_empty()) {
            path.push_str(segment);
            path.push('/');
        }
        for key in keys {
            debug_assert!(
                !key.is_empty() && !key.contains('/'),
                "invalid route segment {key:?} under {prefix:?}"
            );
            path.push_str(key);
            path.push('/');
        }
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Relative file a static site writes this route to.
    pub fn to_file_path(&self) -> PathBuf {
        PathBuf::from(self.0.trim_start_matches('/')).join("index.html")
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a route serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteTarget {
    Article { slug: String },
    Listing { page: usize },
    TagIndex,
    TagListing { tag: String, page: usize },
    AuthorIndex,
    AuthorListing { author: String, page: usize },
    SeriesListing { series: String },
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Article { slug } => write!(f, "article `{slug}`"),
            Self::Listing { page } => write!(f, "listing page {page}"),
            Self::TagIndex => f.write_str("tag index"),
            Self::TagListing { tag, page } => write!(f, "tag `{tag}` page {page}"),
            Self::AuthorIndex => f.write_str("author index"),
            Self::AuthorListing { author, page } => write!(f, "author `{author}` page {page}"),
            Self::SeriesListing { series } => write!(f, "series `{series}`"),
        }
    }
}

/// Two targets claiming the same URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Route conflict at {path}: {first} and {second}")]
pub struct RouteConflict {
    pub path: RoutePath,
    pub first: RouteTarget,
    pub second: RouteTarget,
}

/// URL prefixes for each kind of page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Prefix for article pages (may be empty)
    pub articles: String,

    /// Prefix for the tag index and tag listings
    pub tags: String,

    /// Prefix for the author index and author listings
    pub authors: String,

    /// Prefix for series listings
    pub series: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            articles: "blog".to_string(),
            tags: "tags".to_string(),
            authors: "authors".to_string(),
            series: "series".to_string(),
        }
    }
}

/// Every route of a catalog, keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: BTreeMap<RoutePath, RouteTarget>,
}

impl RouteTable {
    /// What `path` serves.
    pub fn get(&self, path: &str) -> Option<&RouteTarget> {
        self.routes.get(&RoutePath(path.to_string()))
    }

    /// All routes in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&RoutePath, &RouteTarget)> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Resolves documents and listings to [`RoutePath`]s.
#[derive(Debug, Clone, Default)]
pub struct RouteResolver {
    config: RouteConfig,
}

impl RouteResolver {
    pub fn new(config: RouteConfig) -> Self {
        Self { config }
    }

    /// Route of a single article.
    pub fn resolve(&self, doc: &Document) -> RoutePath {
        RoutePath::under(&self.config.articles, [doc.slug.as_str()])
    }

    /// Route of a page of the main listing.
    pub fn listing(&self, page: usize) -> RoutePath {
        paged("", None, page)
    }

    pub fn tag_index(&self) -> RoutePath {
        RoutePath::under(&self.config.tags, None::<&str>)
    }

    /// Route of a page of a tag listing.
    pub fn tag_listing(&self, tag: &str, page: usize) -> RoutePath {
        paged(&self.config.tags, Some(url_segment(tag).as_str()), page)
    }

    pub fn author_index(&self) -> RoutePath {
        RoutePath::under(&self.config.authors, None::<&str>)
    }

    /// Route of a page of an author listing.
    pub fn author_listing(&self, author: &str, page: usize) -> RoutePath {
        paged(&self.config.authors, Some(url_segment(author).as_str()), page)
    }

    pub fn series_listing(&self, series: &str) -> RoutePath {
        RoutePath::under(&self.config.series, [url_segment(series).as_str()])
    }

    /// Route of whatever a target serves.
    pub fn route_of(&self, target: &RouteTarget) -> RoutePath {
        match target {
            RouteTarget::Article { slug } => {
                RoutePath::under(&self.config.articles, [slug.as_str()])
            }
            RouteTarget::Listing { page } => self.listing(*page),
            RouteTarget::TagIndex => self.tag_index(),
            RouteTarget::TagListing { tag, page } => self.tag_listing(tag, *page),
            RouteTarget::AuthorIndex => self.author_index(),
            RouteTarget::AuthorListing { author, page } => self.author_listing(author, *page),
            RouteTarget::SeriesListing { series } => self.series_listing(series),
        }
    }

    /// Every target a catalog publishes, in a fixed order.
    pub fn targets(&self, catalog: &Catalog) -> Vec<RouteTarget> {
        let mut targets: Vec<RouteTarget> = catalog
            .documents()
            .map(|d| RouteTarget::Article {
                slug: d.slug.clone(),
            })
            .collect();

        targets.extend(
            catalog
                .pages()
                .iter()
                .map(|p| RouteTarget::Listing { page: p.number }),
        );

        if catalog.tags().next().is_some() {
            targets.push(RouteTarget::TagIndex);
        }
        for tag in catalog.tags() {
            let slugs = catalog.tag_slugs(&tag.id).unwrap_or_default();
            targets.extend(page_numbers(&catalog.paginate(slugs)).map(|page| {
                RouteTarget::TagListing {
                    tag: tag.id.clone(),
                    page,
                }
            }));
        }

        if catalog.authors().next().is_some() {
            targets.push(RouteTarget::AuthorIndex);
        }
        for author in catalog.authors() {
            let slugs = catalog.author_slugs(&author.id).unwrap_or_default();
            targets.extend(page_numbers(&catalog.paginate(slugs)).map(|page| {
                RouteTarget::AuthorListing {
                    author: author.id.clone(),
                    page,
                }
            }));
        }

        targets.extend(catalog.series().map(|series| RouteTarget::SeriesListing {
            series: series.to_string(),
        }));

        targets
    }

    /// Resolve every target of a catalog, failing on the first path claimed twice.
    pub fn route_table(&self, catalog: &Catalog) -> Result<RouteTable, RouteConflict> {
        let mut routes: BTreeMap<RoutePath, RouteTarget> = BTreeMap::new();

        for target in self.targets(catalog) {
            let path = self.route_of(&target);
            if let Some(first) = routes.get(&path) {
                return Err(RouteConflict {
                    path,
                    first: first.clone(),
                    second: target,
                });
            }
            routes.insert(path, target);
        }

        Ok(RouteTable { routes })
    }

    /// Check that no two targets of a catalog share a path.
    pub fn validate_uniqueness(&self, catalog: &Catalog) -> Result<(), RouteConflict> {
        self.route_table(catalog).map(|_| ())
    }
}

fn paged(prefix: &str, key: Option<&str>, page: usize) -> RoutePath {
    if page <= 1 {
        RoutePath::under(prefix, key)
    } else {
        let number = page.to_string();
        RoutePath::under(prefix, key.into_iter().chain(["page", number.as_str()]))
    }
}

fn page_numbers(pages: &[Page]) -> impl Iterator<Item = usize> + '_ {
    pages.iter().map(|p| p.number)
}
