//! Static site rendering for quire.
//!
//! Turns a published catalog into HTML pages, one per route, plus a JSON
//! manifest of the catalog itself.

pub mod export;
pub mod render;
pub mod templates;
pub mod writer;

pub use export::export_frontmatter;
pub use render::{
    ArticleView, Entry, IndexEntry, Link, ListingView, PageRenderer, PageView, Pagination,
    RenderError, Views,
};
pub use templates::{SiteMeta, TemplateRenderer};
pub use writer::{SiteWriter, WriteError, WriteSummary};
