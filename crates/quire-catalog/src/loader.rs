//! Discovery of article sources.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::source::{DocumentSource, Listing, LoadError, SourceError};

/// One article source, as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSource {
    /// Path relative to the corpus root
    pub path: PathBuf,

    /// Full file contents
    pub raw_text: String,
}

/// An entry selected for loading.
#[derive(Debug)]
enum Entry {
    Readable(PathBuf),
    Failed(LoadError),
}

impl Entry {
    fn path(&self) -> &Path {
        match self {
            Self::Readable(path) => path,
            Self::Failed(err) => err.path(),
        }
    }
}

/// Selects content files from a [`DocumentSource`] and reads them.
///
/// Only files whose extension is recognized are yielded, always in path
/// order, so that every run sees the same sequence for the same store.
pub struct Loader<'a> {
    source: &'a dyn DocumentSource,
    extensions: Vec<String>,
}

impl<'a> Loader<'a> {
    /// Create a loader for the given extensions (with or without a leading dot).
    pub fn new(source: &'a dyn DocumentSource, extensions: &[String]) -> Self {
        Self {
            source,
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Whether `path` carries a recognized content extension.
    pub fn is_content(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn entries(&self) -> Result<Vec<Entry>, SourceError> {
        let Listing { paths, failures } = self.source.list()?;

        let mut entries: Vec<Entry> = paths
            .into_iter()
            .filter(|p| self.is_content(p))
            .map(Entry::Readable)
            .chain(failures.into_iter().map(Entry::Failed))
            .collect();

        entries.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(entries)
    }

    fn load(&self, entry: Entry) -> Result<RawSource, LoadError> {
        match entry {
            Entry::Readable(path) => {
                let raw_text = self.source.read(&path)?;
                Ok(RawSource { path, raw_text })
            }
            Entry::Failed(err) => Err(err),
        }
    }

    /// Lazily read every content file in path order.
    ///
    /// Each call lists the store again, so the sequence can be restarted.
    pub fn iter(
        &self,
    ) -> Result<impl Iterator<Item = Result<RawSource, LoadError>> + '_, SourceError> {
        let entries = self.entries()?;
        Ok(entries.into_iter().map(move |entry| self.load(entry)))
    }

    /// Read every content file on `pool`, returning results in path order.
    pub fn load_all(
        &self,
        pool: &rayon::ThreadPool,
    ) -> Result<Vec<Result<RawSource, LoadError>>, SourceError> {
        let entries = self.entries()?;
        tracing::debug!(
            "Loading {} entries from {}",
            entries.len(),
            self.source.describe()
        );

        let mut loaded: Vec<Result<RawSource, LoadError>> =
            pool.install(|| entries.into_par_iter().map(|e| self.load(e)).collect());

        loaded.sort_by(|a, b| result_path(a).cmp(result_path(b)));
        Ok(loaded)
    }
}

fn result_path(result: &Result<RawSource, LoadError>) -> &Path {
    match result {
        Ok(source) => &source.path,
        Err(err) => err.path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn extensions() -> Vec<String> {
        vec!["md".to_string(), ".MDX".to_string()]
    }

    fn pool() -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap()
    }

    #[test]
    fn filters_by_extension_case_insensitively() {
        let source = MemorySource::new()
            .with("b.mdx", "b")
            .with("a.MD", "a")
            .with("logo.svg", "<svg/>")
            .with("README", "readme");
        let loader = Loader::new(&source, &extensions());

        let paths: Vec<PathBuf> = loader.iter().unwrap().map(|r| r.unwrap().path).collect();

        assert_eq!(paths, vec![PathBuf::from("a.MD"), PathBuf::from("b.mdx")]);
    }

    #[test]
    fn iteration_is_restartable() {
        let source = MemorySource::new().with("one.md", "1").with("two.md", "2");
        let loader = Loader::new(&source, &extensions());

        let first: Vec<_> = loader.iter().unwrap().map(|r| r.unwrap()).collect();
        let second: Vec<_> = loader.iter().unwrap().map(|r| r.unwrap()).collect();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn parallel_load_preserves_path_order() {
        let mut source = MemorySource::new();
        for i in (0..64).rev() {
            source.insert(format!("post-{i:02}.md"), format!("body {i}"));
        }
        let loader = Loader::new(&source, &extensions());

        let loaded = loader.load_all(&pool()).unwrap();
        let paths: Vec<PathBuf> = loaded.into_iter().map(|r| r.unwrap().path).collect();

        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
        assert_eq!(paths.len(), 64);
    }
}
