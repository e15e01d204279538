//! Catalog entities.

use std::collections::BTreeMap;
use std::path::PathBuf;

use quire_mdx::Timestamp;
use serde::{Deserialize, Serialize};

/// A published article.
///
/// Documents are built once by the normalizer and never modified; a content
/// change produces a new document on the next rebuild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Unique, URL-safe identifier derived from the source path
    pub slug: String,

    /// Source path relative to the corpus root
    pub source_path: PathBuf,

    pub title: String,

    pub description: Option<String>,

    /// Publication time
    pub published_at: Timestamp,

    /// Identifier of the resolved [`Author`]
    pub author: String,

    /// Tags, unique by id and sorted by id
    pub tags: Vec<Tag>,

    /// Normalized series identifier
    pub series: Option<String>,

    pub thumb: Option<String>,

    pub cover: Option<String>,

    pub draft: bool,

    /// Frontmatter keys with no built-in meaning
    pub extra: BTreeMap<String, serde_yaml::Value>,

    /// Opaque content payload for the renderer
    pub body: String,
}

impl Document {
    /// Whether the document carries the tag with this id.
    pub fn has_tag(&self, id: &str) -> bool {
        self.tags.iter().any(|t| t.id == id)
    }
}

/// A topic label shared by many documents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Tag {
    /// Lower-cased identifier
    pub id: String,

    /// Display form, as first written
    pub label: String,
}

impl Tag {
    /// Build a tag from its written form. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let label = raw.trim();
        if label.is_empty() {
            return None;
        }

        Some(Self {
            id: label.to_lowercase(),
            label: label.to_string(),
        })
    }
}

/// A byline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,

    pub display_name: String,

    #[serde(default)]
    pub bio: Option<String>,

    #[serde(default)]
    pub avatar: Option<String>,
}

impl Author {
    /// An author with only an id and display name.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            bio: None,
            avatar: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_ids_are_trimmed_and_lowercased() {
        let tag = Tag::parse("  Rust ").unwrap();

        assert_eq!(tag.id, "rust");
        assert_eq!(tag.label, "Rust");
    }

    #[test]
    fn blank_tags_are_rejected() {
        assert_eq!(Tag::parse("   "), None);
    }
}
