//! Whole-document I/O.
//!
//! Documents are read completely, rewritten in memory and persisted only
//! after every region resolved. The write lands in a temporary file next to
//! the document and is renamed over it, so a failed run leaves the original
//! bytes in place.

use crate::error::{Error, Result};
use crate::rewrite::{rewrite, EmbedConfig, FileSystemSource, Rewrite};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Line terminator used when rendering a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// The terminator as text
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// A text file as an ordered sequence of lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Lines without their terminators
    pub lines: Vec<String>,
    /// Terminator of each line; only the last line may have none
    pub endings: Vec<Option<LineEnding>>,
    /// Terminator of the first line break, used for newly emitted lines
    pub line_ending: LineEnding,
}

impl Document {
    /// Splits text into lines, recording each line's own terminator
    pub fn parse(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut endings = Vec::new();

        for piece in text.split_inclusive('\n') {
            let (line, ending) = if let Some(line) = piece.strip_suffix("\r\n") {
                (line, Some(LineEnding::CrLf))
            } else if let Some(line) = piece.strip_suffix('\n') {
                (line, Some(LineEnding::Lf))
            } else {
                (piece, None)
            };
            lines.push(line.to_string());
            endings.push(ending);
        }

        let line_ending = endings.iter().flatten().copied().next().unwrap_or_default();
        Self {
            lines,
            endings,
            line_ending,
        }
    }

    /// Whether the text ends with a line break
    pub fn trailing_newline(&self) -> bool {
        self.endings.last().is_some_and(Option::is_some)
    }

    /// Builds the rewritten document. Lines copied from this document keep
    /// their terminator; emitted lines get [`Document::line_ending`].
    pub fn with_rewrite(&self, rewrite: Rewrite) -> Self {
        let endings = rewrite
            .origins
            .iter()
            .map(|origin| match origin {
                Some(i) => self.endings[*i],
                None => Some(self.line_ending),
            })
            .collect();

        Self {
            lines: rewrite.lines,
            endings,
            line_ending: self.line_ending,
        }
    }

    /// Joins the lines back into text
    pub fn render(&self) -> String {
        let mut text = String::new();
        for (line, ending) in self.lines.iter().zip(&self.endings) {
            text.push_str(line);
            if let Some(ending) = ending {
                text.push_str(ending.as_str());
            }
        }
        text
    }
}

/// Result of processing one document
#[derive(Debug, Clone)]
pub struct EmbedOutcome {
    /// The processed document
    pub path: PathBuf,
    /// Number of regions refreshed
    pub regions: usize,
    /// Whether the rewritten text differs from the file on disk
    pub changed: bool,
    /// The rewritten text
    pub rendered: String,
}

/// Rewrites a document without touching it on disk.
///
/// Source paths in markers are resolved against the document's directory.
pub fn check_file(path: impl AsRef<Path>, config: &EmbedConfig) -> Result<EmbedOutcome> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::document_read(path, e))?;
    let document = Document::parse(&text);

    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut provider = FileSystemSource::new(base_dir).cache(config.cache_sources);

    debug!("Rewriting {} ({} lines)", path.display(), document.lines.len());
    let rewritten = rewrite(&document.lines, &mut provider, config)?;
    let regions = rewritten.regions;
    let rendered = document.with_rewrite(rewritten).render();
    let changed = rendered != text;

    Ok(EmbedOutcome {
        path: path.to_path_buf(),
        regions,
        changed,
        rendered,
    })
}

/// Rewrites a document in place.
///
/// The file is written only if the whole rewrite succeeded and the content
/// actually changed.
pub fn embed_file(path: impl AsRef<Path>, config: &EmbedConfig) -> Result<EmbedOutcome> {
    let outcome = check_file(path, config)?;

    if outcome.changed {
        write_atomic(&outcome.path, &outcome.rendered)?;
        debug!(
            "Wrote {} ({} region(s))",
            outcome.path.display(),
            outcome.regions
        );
    } else {
        debug!("{} is up to date", outcome.path.display());
    }

    Ok(outcome)
}

/// Replaces `path` with `contents` via a sibling temporary file.
///
/// Symlinks are followed so the link target is updated and the link kept.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::document_write(path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| Error::document_write(path, e))?;

    if let Ok(metadata) = fs::metadata(&target) {
        fs::set_permissions(file.path(), metadata.permissions())
            .map_err(|e| Error::document_write(path, e))?;
    }

    file.persist(&target)
        .map_err(|e| Error::document_write(path, e.error))?;
    Ok(())
}
