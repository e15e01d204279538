//! Validated frontmatter metadata.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::date::{parse_date, DateError, Timestamp};

/// Metadata declared in an article's frontmatter block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontmatterRecord {
    /// Article title (required)
    pub title: String,

    /// Publication time (required)
    pub date: Timestamp,

    /// Short summary for listings
    pub description: Option<String>,

    /// Author identifier
    pub author: Option<String>,

    /// Tags as written, in declaration order
    pub tags: Vec<String>,

    /// Thumbnail asset identifier
    pub thumb: Option<String>,

    /// Cover image asset identifier
    pub cover: Option<String>,

    /// Series this article belongs to
    pub series: Option<String>,

    /// Drafts are left out of published builds
    pub draft: bool,

    /// Keys this crate does not interpret, kept verbatim
    pub extra: BTreeMap<String, Value>,
}

impl FrontmatterRecord {
    /// Validate a parsed frontmatter mapping.
    ///
    /// `title` and `date` must be present and non-blank; everything else is
    /// optional. Unknown keys end up in [`FrontmatterRecord::extra`].
    pub fn from_mapping(mapping: Mapping) -> Result<Self, FieldError> {
        let mut fields = BTreeMap::new();
        for (key, value) in mapping {
            let key = scalar_text(&key).ok_or_else(|| FieldError::Invalid {
                field: format!("{key:?}"),
                reason: "keys must be scalars".to_string(),
            })?;
            fields.insert(key, value);
        }

        let title = take_string(&mut fields, "title")?
            .filter(|t| !t.trim().is_empty())
            .ok_or(FieldError::Missing("title"))?;

        let date = take_string(&mut fields, "date")?
            .filter(|d| !d.trim().is_empty())
            .ok_or(FieldError::Missing("date"))?;
        let date = parse_date(&date)?;

        Ok(Self {
            title: title.trim().to_string(),
            date,
            description: take_string(&mut fields, "description")?,
            author: take_string(&mut fields, "author")?,
            tags: take_tags(&mut fields)?,
            thumb: take_string(&mut fields, "thumb")?,
            cover: take_string(&mut fields, "cover")?,
            series: take_string(&mut fields, "series")?,
            draft: take_bool(&mut fields, "draft")?,
            extra: fields,
        })
    }
}

/// Text form of a scalar YAML value.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn take_string(
    fields: &mut BTreeMap<String, Value>,
    field: &'static str,
) -> Result<Option<String>, FieldError> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_text(&value)
            .map(Some)
            .ok_or_else(|| FieldError::invalid(field, "expected a string")),
    }
}

fn take_bool(fields: &mut BTreeMap<String, Value>, field: &'static str) -> Result<bool, FieldError> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(_) => Err(FieldError::invalid(field, "expected true or false")),
    }
}

fn take_tags(fields: &mut BTreeMap<String, Value>) -> Result<Vec<String>, FieldError> {
    match fields.remove("tags") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| {
                scalar_text(item).ok_or_else(|| FieldError::invalid("tags", "tags must be strings"))
            })
            .collect(),
        Some(value) => scalar_text(&value)
            .map(|tag| vec![tag])
            .ok_or_else(|| FieldError::invalid("tags", "expected a list of strings")),
    }
}

/// Errors in individual frontmatter fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("Missing required field: {0}")]
    Missing(&'static str),

    #[error("Invalid field `{field}`: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Invalid field `date`: {0}")]
    Date(#[from] DateError),
}

impl FieldError {
    fn invalid(field: &str, reason: &str) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
