//! Content catalog for quire.
//!
//! Turns a corpus of article sources into an immutable, cross-referenced
//! [`Catalog`]: sources are loaded through a [`DocumentSource`], parsed by
//! `quire-mdx`, normalized into [`Document`]s, indexed by tag, author,
//! series and date, and checked for route conflicts. The [`Pipeline`] runs
//! those stages in order and reports either a publication or the structural
//! errors that prevented one.

pub mod authors;
pub mod cancel;
pub mod catalog;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod routes;
pub mod slug;
pub mod source;

pub use authors::AuthorRegistry;
pub use cancel::CancellationToken;
pub use catalog::{Catalog, IndexConfig, IndexError, Page};
pub use loader::{Loader, RawSource};
pub use model::{Author, Document, Tag};
pub use normalize::{NormalizeError, NormalizeWarning, Normalized, Normalizer};
pub use pipeline::{
    Failure, LoadErrorPolicy, Pipeline, PipelineConfig, PipelineOutcome, Publication, Stage,
    StructuralError, Warning,
};
pub use routes::{RouteConfig, RouteConflict, RoutePath, RouteResolver, RouteTable, RouteTarget};
pub use crate::slug::{slug_from_path, slugify, url_segment};
pub use source::{DocumentSource, FsSource, Listing, LoadError, MemorySource, SourceError};
