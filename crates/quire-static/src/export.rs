//! Frontmatter export for published documents.

use serde_yaml::{Mapping, Value};

use quire_catalog::Document;
use quire_mdx::format_date;

/// Serialize a document back into a frontmatter block followed by its body.
///
/// Parsing the result with [`quire_mdx::parse`] yields the same title, date
/// and tags.
pub fn export_frontmatter(doc: &Document) -> Result<String, serde_yaml::Error> {
    let mut map = Mapping::new();
    map.insert("title".into(), doc.title.clone().into());
    map.insert("date".into(), format_date(&doc.published_at).into());

    if let Some(description) = &doc.description {
        map.insert("description".into(), description.clone().into());
    }
    map.insert("author".into(), doc.author.clone().into());

    if !doc.tags.is_empty() {
        let tags = doc.tags.iter().map(|t| Value::from(t.label.clone())).collect();
        map.insert("tags".into(), Value::Sequence(tags));
    }

    for (key, value) in [
        ("thumb", &doc.thumb),
        ("cover", &doc.cover),
        ("series", &doc.series),
    ] {
        if let Some(value) = value {
            map.insert(key.into(), value.clone().into());
        }
    }
    if doc.draft {
        map.insert("draft".into(), true.into());
    }

    for (key, value) in &doc.extra {
        map.insert(key.clone().into(), value.clone());
    }

    let yaml = serde_yaml::to_string(&map)?;
    Ok(format!("---\n{yaml}---\n{}", doc.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quire_catalog::{AuthorRegistry, Normalizer};
    use quire_mdx::parse;
    use std::path::Path;

    fn normalized(source: &str) -> Document {
        let authors = AuthorRegistry::default();
        let (record, body) = parse(source).unwrap().into_parts();
        Normalizer::new(&authors)
            .normalize(Path::new("post.md"), record, body)
            .unwrap()
            .document
    }

    #[test]
    fn well_formed_metadata_survives_export() {
        let source = "---\ntitle: \"Rust: a love story\"\ndate: 2024-03-05T09:30:00+02:00\ntags: [rust, Web]\nseries: basics\nreading_time: 4\n---\n# Hi\n";
        let doc = normalized(source);

        let exported = export_frontmatter(&doc).unwrap();
        let (record, body) = parse(&exported).unwrap().into_parts();

        assert_eq!(record.title, doc.title);
        assert_eq!(record.date, doc.published_at);
        assert_eq!(record.date.offset(), doc.published_at.offset());
        assert_eq!(record.tags, vec!["rust".to_string(), "Web".to_string()]);
        assert_eq!(record.series.as_deref(), Some("basics"));
        assert_eq!(record.extra.get("reading_time"), Some(&Value::Number(4.into())));
        assert_eq!(body, doc.body);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let doc = normalized("---\ntitle: Bare\ndate: 2024-01-01\n---\n");

        let exported = export_frontmatter(&doc).unwrap();

        assert!(!exported.contains("tags"));
        assert!(!exported.contains("draft"));
        assert!(exported.contains("2024-01-01T00:00:00Z"));
    }
}
