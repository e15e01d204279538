//! Content stores that article sources are loaded from.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A store of raw article sources.
///
/// Paths handed out by [`DocumentSource::list`] are relative to the store
/// and are the identifiers later passed back to [`DocumentSource::read`].
pub trait DocumentSource: Send + Sync {
    /// Human-readable location, used in log messages.
    fn describe(&self) -> String;

    /// Enumerate every file in the store.
    ///
    /// Entries that could not be enumerated are returned as failures rather
    /// than aborting the listing.
    fn list(&self) -> Result<Listing, SourceError>;

    /// Read the full text of one entry.
    fn read(&self, path: &Path) -> Result<String, LoadError>;
}

/// Result of enumerating a [`DocumentSource`].
#[derive(Debug, Default)]
pub struct Listing {
    /// Paths of files found in the store
    pub paths: Vec<PathBuf>,

    /// Entries that could not be enumerated
    pub failures: Vec<LoadError>,
}

/// Errors that make a whole source unusable.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Content directory not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Errors reading a single entry.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },

    #[error("No such entry: {}", path.display())]
    Missing { path: PathBuf },
}

impl LoadError {
    /// Path of the entry that failed.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Walk { path, .. } | Self::Missing { path } => path,
        }
    }
}

/// A content directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The corpus root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }
}

impl DocumentSource for FsSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn list(&self) -> Result<Listing, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::NotFound(self.root.clone()));
        }

        let mut listing = Listing::default();

        for entry in WalkDir::new(&self.root).follow_links(true) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        listing.paths.push(self.relative(entry.path()));
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| self.relative(p))
                        .unwrap_or_else(|| PathBuf::from("."));
                    tracing::debug!("Walk error under {}: {}", self.root.display(), e);
                    listing.failures.push(LoadError::Walk {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(listing)
    }

    fn read(&self, path: &Path) -> Result<String, LoadError> {
        fs::read_to_string(self.root.join(path)).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// An in-memory set of sources, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style.
    pub fn with(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }

    /// Remove a file, returning its text.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> Option<String> {
        self.files.remove(path.as_ref())
    }
}

impl DocumentSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} files)", self.files.len())
    }

    fn list(&self) -> Result<Listing, SourceError> {
        Ok(Listing {
            paths: self.files.keys().cloned().collect(),
            failures: Vec::new(),
        })
    }

    fn read(&self, path: &Path) -> Result<String, LoadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::Missing {
                path: path.to_path_buf(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_files_relative_to_root() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("content");
        fs::create_dir_all(root.join("blog")).unwrap();
        fs::write(root.join("index.mdx"), "x").unwrap();
        fs::write(root.join("blog/hello.md"), "y").unwrap();

        let source = FsSource::new(&root);
        let mut paths = source.list().unwrap().paths;
        paths.sort();

        assert_eq!(
            paths,
            vec![PathBuf::from("blog/hello.md"), PathBuf::from("index.mdx")]
        );
        assert_eq!(source.read(Path::new("blog/hello.md")).unwrap(), "y");
    }

    #[test]
    fn missing_root_is_a_source_error() {
        let temp = tempdir().unwrap();
        let source = FsSource::new(temp.path().join("nope"));

        assert!(matches!(source.list(), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn invalid_utf8_is_a_load_error() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("bad.md"), [0xff, 0xfe, 0x00]).unwrap();

        let source = FsSource::new(temp.path());
        let err = source.read(Path::new("bad.md")).unwrap_err();

        assert_eq!(err.path(), Path::new("bad.md"));
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn memory_source_round_trips() {
        let mut source = MemorySource::new().with("a.md", "alpha");
        source.insert("b.md", "beta");

        assert_eq!(source.list().unwrap().paths.len(), 2);
        assert_eq!(source.read(Path::new("a.md")).unwrap(), "alpha");
        assert_eq!(source.remove("b.md").as_deref(), Some("beta"));
        assert!(matches!(
            source.read(Path::new("b.md")),
            Err(LoadError::Missing { .. })
        ));
    }
}
