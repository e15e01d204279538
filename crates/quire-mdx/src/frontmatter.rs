//! Frontmatter block extraction.

use serde_yaml::{Mapping, Value};

/// The fence that opens and closes a frontmatter block.
const FENCE: &str = "---";

/// Split a source into its frontmatter YAML and the body that follows.
///
/// The block must be the first thing in the file (after an optional byte
/// order mark and blank lines), opened and closed by a line holding only
/// `---`. The body is returned exactly as written after the closing fence.
pub fn split_frontmatter(source: &str) -> Result<(&str, &str), FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let trimmed = source.trim_start();

    let mut lines = trimmed.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Err(FrontmatterError::Missing);
    };
    if first.trim_end() != FENCE {
        return Err(FrontmatterError::Missing);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;

    for line in lines {
        if line.trim_end() == FENCE {
            let yaml = &trimmed[yaml_start..offset];
            let body = &trimmed[offset + line.len()..];
            return Ok((yaml, body));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unclosed)
}

/// Parse a frontmatter block into a YAML mapping.
///
/// An empty block yields an empty mapping so that the missing mandatory
/// fields are reported by name.
pub fn parse_yaml(yaml: &str) -> Result<Mapping, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value =
        serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Errors that can occur when extracting frontmatter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Missing frontmatter block - file must start with ---")]
    Missing,

    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter must be a key/value mapping")]
    NotAMapping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_yaml_and_body() {
        let source = r#"---
title: Launch week
date: 2024-03-05
---

# Launch week
"#;

        let (yaml, body) = split_frontmatter(source).unwrap();

        assert_eq!(yaml, "title: Launch week\ndate: 2024-03-05\n");
        assert_eq!(body, "\n# Launch week\n");
    }

    #[test]
    fn tolerates_bom_and_crlf() {
        let source = "\u{feff}---\r\ntitle: Hi\r\n---\r\nBody";

        let (yaml, body) = split_frontmatter(source).unwrap();

        assert_eq!(yaml, "title: Hi\r\n");
        assert_eq!(body, "Body");
    }

    #[test]
    fn ignores_longer_rules_inside_block() {
        let source = "---\ntitle: x\n----\nmore: y\n---\nbody";

        let (yaml, body) = split_frontmatter(source).unwrap();

        assert!(yaml.contains("more: y"));
        assert_eq!(body, "body");
    }

    #[test]
    fn errors_without_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        assert_eq!(split_frontmatter(source), Err(FrontmatterError::Missing));
        assert_eq!(split_frontmatter(""), Err(FrontmatterError::Missing));
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        assert_eq!(split_frontmatter(source), Err(FrontmatterError::Unclosed));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let result = parse_yaml("title: [invalid yaml\n");

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn empty_block_is_empty_mapping() {
        assert!(parse_yaml("").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_mapping_block() {
        assert_eq!(parse_yaml("- a\n- b\n"), Err(FrontmatterError::NotAMapping));
    }
}
