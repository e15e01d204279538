//! Page views and the renderer seam.

use serde::Serialize;

use quire_catalog::{Author, Catalog, Document, Page, RoutePath, RouteResolver, RouteTarget};

/// Turns a [`PageView`] into markup.
pub trait PageRenderer: Send + Sync {
    fn render(&self, view: &PageView<'_>) -> Result<String, RenderError>;
}

/// Errors that can occur while rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to render template: {0}")]
    Template(#[from] minijinja::Error),
}

/// A link to another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// A document as it appears in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Entry<'a> {
    pub document: &'a Document,
    pub author: &'a Author,
    pub url: String,
    /// Publication date as `YYYY-MM-DD`
    pub date: String,
}

/// Position within a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub number: usize,
    pub total: usize,
    pub previous: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleView<'a> {
    pub entry: Entry<'a>,
    pub tags: Vec<Link>,
    /// Other parts of the article's series, in reading order
    pub series: Vec<Link>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingView<'a> {
    pub heading: String,
    pub entries: Vec<Entry<'a>>,
    pub pagination: Pagination,
}

/// A tag or author on an index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub label: String,
    pub url: String,
    pub count: usize,
}

/// Everything a renderer needs for one page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageView<'a> {
    Article(ArticleView<'a>),
    Listing(ListingView<'a>),
    TagIndex { tags: Vec<IndexEntry> },
    AuthorIndex { authors: Vec<IndexEntry> },
}

impl PageView<'_> {
    /// Page title.
    pub fn title(&self) -> &str {
        match self {
            Self::Article(article) => &article.entry.document.title,
            Self::Listing(listing) => &listing.heading,
            Self::TagIndex { .. } => "Tags",
            Self::AuthorIndex { .. } => "Authors",
        }
    }
}

/// Builds [`PageView`]s for the routes of one catalog.
pub struct Views<'a> {
    catalog: &'a Catalog,
    resolver: &'a RouteResolver,
    base_url: &'a str,
}

impl<'a> Views<'a> {
    pub fn new(catalog: &'a Catalog, resolver: &'a RouteResolver, base_url: &'a str) -> Self {
        Self {
            catalog,
            resolver,
            base_url,
        }
    }

    /// Absolute URL of a route under the site's base URL.
    pub fn url(&self, path: &RoutePath) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// View for a route target, or `None` if the target is not in the catalog.
    pub fn view(&self, target: &RouteTarget) -> Option<PageView<'a>> {
        let catalog = self.catalog;

        match target {
            RouteTarget::Article { slug } => self.article(catalog.get(slug)?).map(PageView::Article),

            RouteTarget::Listing { page } => {
                let current = catalog.page(*page)?;
                self.listing("Latest".to_string(), current, |n| self.resolver.listing(n))
            }

            RouteTarget::TagListing { tag, page } => {
                let label = &catalog.tag(tag)?.label;
                let pages = catalog.paginate(catalog.tag_slugs(tag)?);
                let current = pages.get(page.checked_sub(1)?)?;
                self.listing(format!("Tagged {label}"), current, |n| {
                    self.resolver.tag_listing(tag, n)
                })
            }

            RouteTarget::AuthorListing { author, page } => {
                let name = &catalog.author(author)?.display_name;
                let pages = catalog.paginate(catalog.author_slugs(author)?);
                let current = pages.get(page.checked_sub(1)?)?;
                self.listing(format!("Posts by {name}"), current, |n| {
                    self.resolver.author_listing(author, n)
                })
            }

            RouteTarget::SeriesListing { series } => {
                let slugs = catalog.series_slugs(series)?;
                let whole = Page {
                    number: 1,
                    total: 1,
                    slugs: slugs.to_vec(),
                };
                self.listing(format!("Series: {series}"), &whole, |_| {
                    self.resolver.series_listing(series)
                })
            }

            RouteTarget::TagIndex => {
                let tags = catalog
                    .tags()
                    .map(|tag| IndexEntry {
                        label: tag.label.clone(),
                        url: self.url(&self.resolver.tag_listing(&tag.id, 1)),
                        count: catalog.tag_slugs(&tag.id).map_or(0, <[String]>::len),
                    })
                    .collect();
                Some(PageView::TagIndex { tags })
            }

            RouteTarget::AuthorIndex => {
                let authors = catalog
                    .authors()
                    .map(|author| IndexEntry {
                        label: author.display_name.clone(),
                        url: self.url(&self.resolver.author_listing(&author.id, 1)),
                        count: catalog.author_slugs(&author.id).map_or(0, <[String]>::len),
                    })
                    .collect();
                Some(PageView::AuthorIndex { authors })
            }
        }
    }

    fn entry(&self, document: &'a Document) -> Option<Entry<'a>> {
        Some(Entry {
            document,
            author: self.catalog.author(&document.author)?,
            url: self.url(&self.resolver.resolve(document)),
            date: document.published_at.format("%Y-%m-%d").to_string(),
        })
    }

    fn article(&self, document: &'a Document) -> Option<ArticleView<'a>> {
        let tags = document
            .tags
            .iter()
            .map(|tag| Link {
                label: tag.label.clone(),
                url: self.url(&self.resolver.tag_listing(&tag.id, 1)),
            })
            .collect();

        let series = document
            .series
            .as_deref()
            .map(|series| {
                self.catalog
                    .by_series(series)
                    .into_iter()
                    .filter(|other| other.slug != document.slug)
                    .map(|other| Link {
                        label: other.title.clone(),
                        url: self.url(&self.resolver.resolve(other)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(ArticleView {
            entry: self.entry(document)?,
            tags,
            series,
        })
    }

    fn listing(
        &self,
        heading: String,
        page: &Page,
        route: impl Fn(usize) -> RoutePath,
    ) -> Option<PageView<'a>> {
        let entries = self
            .catalog
            .resolve(&page.slugs)
            .into_iter()
            .map(|doc| self.entry(doc))
            .collect::<Option<Vec<_>>>()?;

        let pagination = Pagination {
            number: page.number,
            total: page.total,
            previous: (page.number > 1).then(|| self.url(&route(page.number - 1))),
            next: (page.number < page.total).then(|| self.url(&route(page.number + 1))),
        };

        Some(PageView::Listing(ListingView {
            heading,
            entries,
            pagination,
        }))
    }
}
