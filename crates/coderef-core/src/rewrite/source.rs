//! Source file access for the rewriter.
//!
//! The [`SourceProvider`] trait resolves the relative paths written in
//! document markers and reads the referenced files.

use crate::document::Document;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Resolves and reads the source files referenced by a document.
///
/// # Example
///
/// ```
/// use coderef_core::rewrite::SourceProvider;
/// use coderef_core::Result;
/// use std::path::{Path, PathBuf};
///
/// struct Fixed(Vec<String>);
///
/// impl SourceProvider for Fixed {
///     fn resolve(&self, relative_path: &str) -> PathBuf {
///         PathBuf::from(relative_path)
///     }
///
///     fn read_lines(&mut self, _path: &Path) -> Result<Vec<String>> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait SourceProvider {
    /// Turns the path written in a start marker into the path to read
    fn resolve(&self, relative_path: &str) -> PathBuf;

    /// Reads the whole file as lines
    fn read_lines(&mut self, path: &Path) -> Result<Vec<String>>;
}

/// Reads source files from disk, relative to a base directory
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    base_dir: PathBuf,
    cache: Option<HashMap<PathBuf, Vec<String>>>,
}

impl FileSystemSource {
    /// Creates an uncached provider rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache: None,
        }
    }

    /// Enables or disables caching of file contents for this provider's lifetime
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(HashMap::new);
        self
    }

    /// Directory relative paths are resolved against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl SourceProvider for FileSystemSource {
    fn resolve(&self, relative_path: &str) -> PathBuf {
        self.base_dir.join(relative_path)
    }

    fn read_lines(&mut self, path: &Path) -> Result<Vec<String>> {
        if let Some(lines) = self.cache.as_ref().and_then(|c| c.get(path)) {
            trace!("Using cached source {}", path.display());
            return Ok(lines.clone());
        }

        trace!("Reading source {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| Error::source_unreadable(path, e))?;
        let lines = Document::parse(&text).lines;

        if let Some(cache) = self.cache.as_mut() {
            cache.insert(path.to_path_buf(), lines.clone());
        }
        Ok(lines)
    }
}

/// Serves source files from memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    base_dir: PathBuf,
    files: HashMap<PathBuf, String>,
    reads: usize,
}

impl MemorySource {
    /// Creates an empty provider rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Adds a file, keyed by its resolved path
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> &mut Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    /// Builder-style variant of [`MemorySource::insert`] taking a path
    /// relative to the base directory
    pub fn with_file(mut self, relative_path: &str, contents: impl Into<String>) -> Self {
        let path = self.resolve(relative_path);
        self.insert(path, contents);
        self
    }

    /// Number of successful reads served so far
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl SourceProvider for MemorySource {
    fn resolve(&self, relative_path: &str) -> PathBuf {
        self.base_dir.join(relative_path)
    }

    fn read_lines(&mut self, path: &Path) -> Result<Vec<String>> {
        let text = self.files.get(path).ok_or_else(|| {
            Error::source_unreadable(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            )
        })?;
        self.reads += 1;
        Ok(Document::parse(text).lines)
    }
}
