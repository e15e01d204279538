//! Registry of known authors.

use std::collections::BTreeMap;

use crate::model::Author;

/// Known authors, with a fallback for documents whose byline is missing or
/// unknown.
#[derive(Debug, Clone)]
pub struct AuthorRegistry {
    /// Authors by lower-cased id
    authors: BTreeMap<String, Author>,

    /// Id of the fallback author, always present in `authors`
    fallback: String,
}

/// Outcome of looking up a declared byline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The declared id is registered
    Known(&'a Author),

    /// No byline was declared
    Fallback(&'a Author),

    /// The declared id is not registered; the fallback stands in
    Unknown(&'a Author),
}

impl<'a> Resolution<'a> {
    /// The author the document ends up attributed to.
    pub fn author(&self) -> &'a Author {
        match *self {
            Self::Known(a) | Self::Fallback(a) | Self::Unknown(a) => a,
        }
    }
}

impl AuthorRegistry {
    /// Create a registry holding only the fallback author.
    pub fn new(fallback: Author) -> Self {
        let mut registry = Self {
            authors: BTreeMap::new(),
            fallback: normalize_id(&fallback.id),
        };
        registry.register(fallback);
        registry
    }

    /// Add or replace an author. Lookups are case-insensitive.
    pub fn register(&mut self, mut author: Author) {
        author.id = normalize_id(&author.id);
        self.authors.insert(author.id.clone(), author);
    }

    /// Look up an author by id (case-insensitive).
    pub fn get(&self, id: &str) -> Option<&Author> {
        self.authors.get(&normalize_id(id))
    }

    /// The author used when a byline is missing or unknown.
    pub fn fallback(&self) -> &Author {
        &self.authors[&self.fallback]
    }

    /// Resolve a declared byline.
    pub fn resolve(&self, declared: Option<&str>) -> Resolution<'_> {
        match declared.map(str::trim).filter(|id| !id.is_empty()) {
            None => Resolution::Fallback(self.fallback()),
            Some(id) => match self.get(id) {
                Some(author) => Resolution::Known(author),
                None => Resolution::Unknown(self.fallback()),
            },
        }
    }

    /// Number of registered authors, fallback included.
    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

impl Default for AuthorRegistry {
    fn default() -> Self {
        Self::new(Author::new("staff", "Staff"))
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AuthorRegistry {
        let mut registry = AuthorRegistry::new(Author::new("team", "The Team"));
        registry.register(Author::new("Ada", "Ada Lovelace"));
        registry
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let registry = registry();

        assert_eq!(registry.get("ADA").unwrap().display_name, "Ada Lovelace");
        assert_eq!(registry.get("ada").unwrap().id, "ada");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolves_known_missing_and_unknown_bylines() {
        let registry = registry();

        assert!(matches!(registry.resolve(Some("ada")), Resolution::Known(a) if a.id == "ada"));
        assert!(matches!(registry.resolve(None), Resolution::Fallback(a) if a.id == "team"));
        assert!(matches!(registry.resolve(Some("  ")), Resolution::Fallback(_)));
        assert!(matches!(registry.resolve(Some("grace")), Resolution::Unknown(a) if a.id == "team"));
    }

    #[test]
    fn re_registering_fallback_keeps_it_resolvable() {
        let mut registry = registry();
        registry.register(Author::new("TEAM", "Editorial Team"));

        assert_eq!(registry.fallback().display_name, "Editorial Team");
    }
}
