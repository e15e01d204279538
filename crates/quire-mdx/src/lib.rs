//! MDX frontmatter parsing for quire content.
//!
//! This crate splits an article source into its YAML frontmatter block and
//! body, validates the metadata every article must carry, and parses
//! publication dates into timezone-aware timestamps.

pub mod date;
pub mod frontmatter;
pub mod parser;
pub mod record;

pub use date::{format_date, parse_date, DateError, Timestamp};
pub use frontmatter::{parse_yaml, split_frontmatter, FrontmatterError};
pub use parser::{parse, ParseError, ParsedDoc};
pub use record::{FieldError, FrontmatterRecord};
