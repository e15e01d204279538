//! Article source parser.

use crate::frontmatter::{parse_yaml, split_frontmatter, FrontmatterError};
use crate::record::{FieldError, FrontmatterRecord};

/// A parsed article source.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDoc {
    /// Validated frontmatter
    pub frontmatter: FrontmatterRecord,

    /// Everything after the frontmatter block, untouched
    pub body: String,
}

impl ParsedDoc {
    /// Split into metadata and body.
    pub fn into_parts(self) -> (FrontmatterRecord, String) {
        (self.frontmatter, self.body)
    }
}

/// Errors that can occur when parsing an article source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("{0}")]
    Field(#[from] FieldError),
}

impl ParseError {
    /// The mandatory field this error reports as missing, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        match self {
            Self::Field(FieldError::Missing(field)) => Some(*field),
            _ => None,
        }
    }
}

/// Parse an article source into validated frontmatter and body.
pub fn parse(source: &str) -> Result<ParsedDoc, ParseError> {
    let (yaml, body) = split_frontmatter(source)?;
    let mapping = parse_yaml(yaml)?;
    let frontmatter = FrontmatterRecord::from_mapping(mapping)?;

    Ok(ParsedDoc {
        frontmatter,
        body: body.to_string(),
    })
}
