//! Conversion of parsed frontmatter into catalog documents.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use quire_mdx::FrontmatterRecord;

use crate::authors::{AuthorRegistry, Resolution};
use crate::model::{Document, Tag};
use crate::slug::slug_from_path;

/// A normalized document plus the non-fatal issues found on the way.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub document: Document,
    pub warnings: Vec<NormalizeWarning>,
}

/// Issues that do not keep a document out of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeWarning {
    #[error("Unknown author `{author}` in {}, attributed to `{fallback}`", path.display())]
    UnknownAuthor {
        path: PathBuf,
        author: String,
        fallback: String,
    },
}

impl NormalizeWarning {
    pub fn path(&self) -> &Path {
        match self {
            Self::UnknownAuthor { path, .. } => path,
        }
    }
}

/// Errors that keep a document out of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Duplicate slug `{slug}`: {} and {}", first.display(), second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Path {} does not produce a usable slug", path.display())]
    EmptySlug { path: PathBuf },
}

impl NormalizeError {
    /// Structural errors invalidate the whole catalog, not just one document.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::DuplicateSlug { .. })
    }
}

/// Builds [`Document`]s, remembering every slug it has handed out.
pub struct Normalizer<'a> {
    authors: &'a AuthorRegistry,
    seen: HashMap<String, PathBuf>,
}

impl<'a> Normalizer<'a> {
    pub fn new(authors: &'a AuthorRegistry) -> Self {
        Self {
            authors,
            seen: HashMap::new(),
        }
    }

    /// Normalize one parsed source.
    ///
    /// Fails if the path yields no slug, or a slug already produced by a
    /// different path. An unknown author is not an error: the document is
    /// attributed to the fallback author and a warning is returned.
    pub fn normalize(
        &mut self,
        path: &Path,
        record: FrontmatterRecord,
        body: String,
    ) -> Result<Normalized, NormalizeError> {
        let slug = slug_from_path(path);
        if slug.is_empty() {
            return Err(NormalizeError::EmptySlug {
                path: path.to_path_buf(),
            });
        }

        if let Some(first) = self.seen.get(&slug) {
            if first != path {
                return Err(NormalizeError::DuplicateSlug {
                    slug,
                    first: first.clone(),
                    second: path.to_path_buf(),
                });
            }
        }

        let mut warnings = Vec::new();
        let resolution = self.authors.resolve(record.author.as_deref());
        if let Resolution::Unknown(fallback) = resolution {
            let warning = NormalizeWarning::UnknownAuthor {
                path: path.to_path_buf(),
                author: record.author.clone().unwrap_or_default(),
                fallback: fallback.id.clone(),
            };
            tracing::warn!("{}", warning);
            warnings.push(warning);
        }

        let document = Document {
            slug: slug.clone(),
            source_path: path.to_path_buf(),
            title: record.title,
            description: record.description,
            published_at: record.date,
            author: resolution.author().id.clone(),
            tags: normalize_tags(&record.tags),
            series: record
                .series
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            thumb: record.thumb,
            cover: record.cover,
            draft: record.draft,
            extra: record.extra,
            body,
        };

        self.seen.insert(slug, path.to_path_buf());

        Ok(Normalized { document, warnings })
    }
}

/// Trim, lower-case and de-duplicate tags. The first spelling of a tag wins
/// as its label; the result is sorted by id.
pub fn normalize_tags(raw: &[String]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::with_capacity(raw.len());

    for tag in raw.iter().filter_map(|t| Tag::parse(t)) {
        if !tags.iter().any(|t| t.id == tag.id) {
            tags.push(tag);
        }
    }

    tags.sort_by(|a, b| a.id.cmp(&b.id));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Author;
    use pretty_assertions::assert_eq;
    use quire_mdx::parse;

    fn registry() -> AuthorRegistry {
        let mut registry = AuthorRegistry::new(Author::new("team", "The Team"));
        registry.register(Author::new("ada", "Ada Lovelace"));
        registry
    }

    fn record(yaml: &str) -> (FrontmatterRecord, String) {
        parse(&format!("---\n{yaml}---\nBody")).unwrap().into_parts()
    }

    #[test]
    fn builds_document_from_record() {
        let authors = registry();
        let mut normalizer = Normalizer::new(&authors);
        let (fm, body) = record(
            "title: Hello\ndate: 2024-01-01\nauthor: Ada\ntags: [Rust, ' rust ', Web]\nseries: ' Getting Started '\n",
        );

        let normalized = normalizer
            .normalize(Path::new("blog/Hello.mdx"), fm, body)
            .unwrap();
        let doc = normalized.document;

        assert_eq!(doc.slug, "blog-hello");
        assert_eq!(doc.author, "ada");
        assert_eq!(
            doc.tags.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["rust", "web"]
        );
        assert_eq!(doc.tags[0].label, "Rust");
        assert_eq!(doc.series.as_deref(), Some("getting started"));
        assert_eq!(doc.body, "Body");
        assert!(normalized.warnings.is_empty());
    }

    #[test]
    fn unknown_author_falls_back_with_warning() {
        let authors = registry();
        let mut normalizer = Normalizer::new(&authors);
        let (fm, body) = record("title: Hi\ndate: 2024-01-01\nauthor: grace\n");

        let normalized = normalizer.normalize(Path::new("hi.md"), fm, body).unwrap();

        assert_eq!(normalized.document.author, "team");
        assert_eq!(
            normalized.warnings,
            vec![NormalizeWarning::UnknownAuthor {
                path: PathBuf::from("hi.md"),
                author: "grace".to_string(),
                fallback: "team".to_string(),
            }]
        );
    }

    #[test]
    fn missing_author_falls_back_silently() {
        let authors = registry();
        let mut normalizer = Normalizer::new(&authors);
        let (fm, body) = record("title: Hi\ndate: 2024-01-01\n");

        let normalized = normalizer.normalize(Path::new("hi.md"), fm, body).unwrap();

        assert_eq!(normalized.document.author, "team");
        assert!(normalized.warnings.is_empty());
    }

    #[test]
    fn colliding_paths_are_duplicate_slugs() {
        let authors = registry();
        let mut normalizer = Normalizer::new(&authors);
        let (fm, body) = record("title: One\ndate: 2024-01-01\n");
        normalizer
            .normalize(Path::new("Hello-World.mdx"), fm.clone(), body.clone())
            .unwrap();

        let err = normalizer
            .normalize(Path::new("hello_world.md"), fm, body)
            .unwrap_err();

        assert!(err.is_structural());
        assert_eq!(
            err,
            NormalizeError::DuplicateSlug {
                slug: "hello-world".to_string(),
                first: PathBuf::from("Hello-World.mdx"),
                second: PathBuf::from("hello_world.md"),
            }
        );
    }

    #[test]
    fn empty_slug_is_not_structural() {
        let authors = registry();
        let mut normalizer = Normalizer::new(&authors);
        let (fm, body) = record("title: Odd\ndate: 2024-01-01\n");

        let err = normalizer.normalize(Path::new("???.md"), fm, body).unwrap_err();

        assert!(!err.is_structural());
    }

    #[test]
    fn well_formed_tags_are_unchanged() {
        let raw = vec!["editor".to_string(), "rust".to_string()];

        let tags = normalize_tags(&raw);

        assert_eq!(
            tags.iter().map(|t| t.label.clone()).collect::<Vec<_>>(),
            raw
        );
    }
}
