//! Cross-referenced index over all published documents.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use chrono::Datelike;
use serde::Serialize;

use crate::authors::AuthorRegistry;
use crate::model::{Author, Document, Tag};

/// Indexing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Documents per listing page
    pub page_size: NonZeroUsize,
}

const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(size) => size,
    None => unreachable!(),
};

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One window of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based page number
    pub number: usize,

    /// Number of pages in the listing
    pub total: usize,

    /// Slugs on this page, in listing order
    pub slugs: Vec<String>,
}

/// Errors found while indexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("Duplicate slug `{slug}` in catalog: {} and {}", first.display(), second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Immutable snapshot of every published document and its indices.
///
/// Built from scratch by [`Catalog::build`] on every run. Every slug held by
/// an index resolves in `documents_by_slug`, and no index keeps an empty
/// group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    documents_by_slug: BTreeMap<String, Document>,
    documents_by_tag: BTreeMap<String, Vec<String>>,
    documents_by_author: BTreeMap<String, Vec<String>>,
    documents_by_series: BTreeMap<String, Vec<String>>,
    archive: BTreeMap<i32, Vec<String>>,
    chronological: Vec<String>,
    pages: Vec<Page>,
    tags: BTreeMap<String, Tag>,
    authors: BTreeMap<String, Author>,
    page_size: usize,
}

/// Listing order: newest first, ties broken by slug.
fn newest_first(a: &Document, b: &Document) -> Ordering {
    b.published_at
        .cmp(&a.published_at)
        .then_with(|| a.slug.cmp(&b.slug))
}

/// Reading order for series: oldest first, ties broken by slug.
fn oldest_first(a: &Document, b: &Document) -> Ordering {
    a.published_at
        .cmp(&b.published_at)
        .then_with(|| a.slug.cmp(&b.slug))
}

impl Catalog {
    /// Index a complete document set.
    ///
    /// The result depends only on the set of documents, not on the order
    /// they are supplied in.
    pub fn build(
        documents: impl IntoIterator<Item = Document>,
        config: &IndexConfig,
        authors: &AuthorRegistry,
    ) -> Result<Self, IndexError> {
        let mut documents_by_slug: BTreeMap<String, Document> = BTreeMap::new();

        for doc in documents {
            if let Some(existing) = documents_by_slug.get(&doc.slug) {
                let (first, second) = if existing.source_path <= doc.source_path {
                    (existing.source_path.clone(), doc.source_path.clone())
                } else {
                    (doc.source_path.clone(), existing.source_path.clone())
                };
                return Err(IndexError::DuplicateSlug {
                    slug: doc.slug.clone(),
                    first,
                    second,
                });
            }
            documents_by_slug.insert(doc.slug.clone(), doc);
        }

        let mut ordered: Vec<&Document> = documents_by_slug.values().collect();
        ordered.sort_by(|a, b| newest_first(a, b));

        let mut documents_by_tag: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut documents_by_author: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut series_members: BTreeMap<String, Vec<&Document>> = BTreeMap::new();
        let mut archive: BTreeMap<i32, Vec<String>> = BTreeMap::new();
        let mut tags: BTreeMap<String, Tag> = BTreeMap::new();
        let mut referenced_authors: BTreeMap<String, Author> = BTreeMap::new();

        // Walking in listing order keeps every group in listing order too.
        for &doc in &ordered {
            for tag in &doc.tags {
                documents_by_tag
                    .entry(tag.id.clone())
                    .or_default()
                    .push(doc.slug.clone());
                tags.entry(tag.id.clone()).or_insert_with(|| tag.clone());
            }

            documents_by_author
                .entry(doc.author.clone())
                .or_default()
                .push(doc.slug.clone());
            referenced_authors
                .entry(doc.author.clone())
                .or_insert_with(|| {
                    authors
                        .get(&doc.author)
                        .cloned()
                        .unwrap_or_else(|| Author::new(&doc.author, &doc.author))
                });

            if let Some(series) = &doc.series {
                series_members.entry(series.clone()).or_default().push(doc);
            }

            archive
                .entry(doc.published_at.year())
                .or_default()
                .push(doc.slug.clone());
        }

        let documents_by_series = series_members
            .into_iter()
            .map(|(series, mut members)| {
                members.sort_by(|a, b| oldest_first(a, b));
                let slugs = members.into_iter().map(|d| d.slug.clone()).collect();
                (series, slugs)
            })
            .collect();

        let chronological: Vec<String> = ordered.iter().map(|d| d.slug.clone()).collect();
        let page_size = config.page_size.get();
        let pages = paginate(&chronological, page_size);

        let mut catalog = Self {
            documents_by_slug,
            documents_by_tag,
            documents_by_author,
            documents_by_series,
            archive,
            chronological,
            pages,
            tags,
            authors: referenced_authors,
            page_size,
        };
        catalog.prune();

        tracing::debug!(
            "Indexed {} documents, {} tags, {} authors, {} pages",
            catalog.len(),
            catalog.tags.len(),
            catalog.authors.len(),
            catalog.pages.len()
        );

        Ok(catalog)
    }

    fn prune(&mut self) {
        self.documents_by_tag.retain(|_, slugs| !slugs.is_empty());
        self.documents_by_author.retain(|_, slugs| !slugs.is_empty());
        self.documents_by_series.retain(|_, slugs| !slugs.is_empty());
        self.archive.retain(|_, slugs| !slugs.is_empty());

        let tag_index = &self.documents_by_tag;
        self.tags.retain(|id, _| tag_index.contains_key(id));
        let author_index = &self.documents_by_author;
        self.authors.retain(|id, _| author_index.contains_key(id));
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents_by_slug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents_by_slug.is_empty()
    }

    /// Look up a document by slug.
    pub fn get(&self, slug: &str) -> Option<&Document> {
        self.documents_by_slug.get(slug)
    }

    /// All documents in slug order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents_by_slug.values()
    }

    /// All documents, newest first.
    pub fn chronological(&self) -> Vec<&Document> {
        self.resolve(&self.chronological)
    }

    /// Slugs of all documents, newest first.
    pub fn chronological_slugs(&self) -> &[String] {
        &self.chronological
    }

    /// Slugs carrying a tag, newest first. Accepts any spelling of the tag.
    pub fn tag_slugs(&self, tag: &str) -> Option<&[String]> {
        self.documents_by_tag
            .get(&tag.trim().to_lowercase())
            .map(Vec::as_slice)
    }

    /// Documents carrying a tag, newest first.
    pub fn by_tag(&self, tag: &str) -> Vec<&Document> {
        self.tag_slugs(tag).map(|s| self.resolve(s)).unwrap_or_default()
    }

    /// Slugs attributed to an author, newest first.
    pub fn author_slugs(&self, author: &str) -> Option<&[String]> {
        self.documents_by_author
            .get(&author.trim().to_lowercase())
            .map(Vec::as_slice)
    }

    /// Documents attributed to an author, newest first.
    pub fn by_author(&self, author: &str) -> Vec<&Document> {
        self.author_slugs(author)
            .map(|s| self.resolve(s))
            .unwrap_or_default()
    }

    /// Slugs in a series, in reading order (oldest first).
    pub fn series_slugs(&self, series: &str) -> Option<&[String]> {
        self.documents_by_series
            .get(&series.trim().to_lowercase())
            .map(Vec::as_slice)
    }

    /// Documents in a series, in reading order.
    pub fn by_series(&self, series: &str) -> Vec<&Document> {
        self.series_slugs(series)
            .map(|s| self.resolve(s))
            .unwrap_or_default()
    }

    /// Slugs grouped by publication year, newest first within each year.
    pub fn archive(&self) -> &BTreeMap<i32, Vec<String>> {
        &self.archive
    }

    /// Every tag in use, by id.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    /// Look up a tag by id.
    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.get(id)
    }

    /// Every author with at least one document, by id.
    pub fn authors(&self) -> impl Iterator<Item = &Author> {
        self.authors.values()
    }

    /// Look up an author with at least one document.
    pub fn author(&self, id: &str) -> Option<&Author> {
        self.authors.get(id)
    }

    /// Series identifiers in use.
    pub fn series(&self) -> impl Iterator<Item = &str> {
        self.documents_by_series.keys().map(String::as_str)
    }

    /// Paginated windows over the chronological listing.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Look up a listing page by 1-based number.
    pub fn page(&self, number: usize) -> Option<&Page> {
        number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Paginate any slug sequence with the catalog's page size.
    pub fn paginate(&self, slugs: &[String]) -> Vec<Page> {
        paginate(slugs, self.page_size)
    }

    /// Resolve slugs to documents, skipping any that are not in the catalog.
    pub fn resolve(&self, slugs: &[String]) -> Vec<&Document> {
        slugs.iter().filter_map(|s| self.get(s)).collect()
    }
}

fn paginate(slugs: &[String], page_size: usize) -> Vec<Page> {
    let total = slugs.len().div_ceil(page_size);

    slugs
        .chunks(page_size)
        .enumerate()
        .map(|(index, chunk)| Page {
            number: index + 1,
            total,
            slugs: chunk.to_vec(),
        })
        .collect()
}
