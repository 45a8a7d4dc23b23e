//! # coderef-core
//!
//! A library for keeping code samples in text documents in sync with the
//! source files they are taken from.
//!
//! A document marks each sample with a start and an end marker. The start
//! marker names a snippet and the file it lives in; that file marks the
//! snippet with its own pair of markers. Rewriting a document replaces
//! everything between each marker pair with a fenced, de-indented copy of
//! the current snippet and leaves all other lines untouched.
//!
//! ## Architecture
//!
//! - [`marker`]: Recognizes and decodes markers on single lines
//! - [`snippet`]: Extracts named regions and strips their common indentation
//! - [`rewrite`]: The document state machine and the [`SourceProvider`] seam
//! - [`document`]: Whole-file reading, rendering and atomic write-back
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use coderef_core::{embed_file, EmbedConfig};
//!
//! let outcome = embed_file("README.md", &EmbedConfig::default())?;
//! if outcome.changed {
//!     println!("refreshed {} region(s)", outcome.regions);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod document;
pub mod error;
pub mod marker;
pub mod rewrite;
pub mod snippet;

// Re-export primary types for convenience
pub use document::{check_file, embed_file, Document, EmbedOutcome, LineEnding};
pub use error::{Error, Result};
pub use marker::{LineScan, MalformedMarker, Marker, MarkerSyntax};
pub use rewrite::{
    rewrite, EmbedConfig, FileSystemSource, MemorySource, Rewrite, Rewriter, SourceProvider,
};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
