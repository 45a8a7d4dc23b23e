//! Error types for the coderef-core library.
//!
//! Every failure aborts the rewrite of the document being processed. Marker
//! and snippet errors are deterministic content errors; the remaining
//! variants wrap I/O failures.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for coderef operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all coderef operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read the document being rewritten
    #[error("failed to read document '{path}': {source}")]
    DocumentRead {
        /// Path to the document
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to persist the rewritten document
    #[error("failed to write document '{path}': {source}")]
    DocumentWrite {
        /// Path to the document
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A source file referenced by a start marker could not be read
    #[error("failed to read source file '{path}': {source}")]
    SourceFileUnreadable {
        /// Resolved path of the source file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An end marker appeared with no open region
    #[error("unexpected end marker on line {line}")]
    UnexpectedEndMarker {
        /// 1-based document line of the end marker
        line: usize,
    },

    /// A start marker was never closed before the end of the document
    #[error("region '{name}' opened on line {line} is never closed")]
    UnterminatedRegion {
        /// Snippet name of the open region
        name: String,
        /// 1-based document line of the start marker
        line: usize,
    },

    /// The named region does not exist (or is not closed) in the source file
    #[error("snippet '{name}' not found in '{path}'")]
    SnippetNotFound {
        /// Requested snippet name
        name: String,
        /// Resolved path of the source file that was searched
        path: PathBuf,
    },

    /// A document start marker carries no source path
    #[error("start marker for '{name}' on line {line} has no source path")]
    MissingSourcePath {
        /// Snippet name of the marker
        name: String,
        /// 1-based document line of the start marker
        line: usize,
    },
}

impl Error {
    /// Creates a new document read error
    pub fn document_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DocumentRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new document write error
    pub fn document_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DocumentWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new unreadable source file error
    pub fn source_unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceFileUnreadable {
            path: path.into(),
            source,
        }
    }

    /// Creates a new snippet-not-found error
    pub fn snippet_not_found(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::SnippetNotFound {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a new unterminated region error
    pub fn unterminated_region(name: impl Into<String>, line: usize) -> Self {
        Self::UnterminatedRegion {
            name: name.into(),
            line,
        }
    }

    /// Creates a new missing source path error
    pub fn missing_source_path(name: impl Into<String>, line: usize) -> Self {
        Self::MissingSourcePath {
            name: name.into(),
            line,
        }
    }

    /// Returns true if the error comes from the document or source content
    /// rather than from the filesystem
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEndMarker { .. }
                | Self::UnterminatedRegion { .. }
                | Self::SnippetNotFound { .. }
                | Self::MissingSourcePath { .. }
        )
    }
}
