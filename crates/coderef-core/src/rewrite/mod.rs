//! Document rewriting.
//!
//! The [`Rewriter`] walks a document line by line with two states:
//!
//! - **Scanning**: plain lines pass through; a start marker embeds a fresh
//!   copy of its snippet and switches to skipping; an end marker is an error.
//! - **Skipping**: the stale content of the open region is dropped until the
//!   end marker, which is kept and switches back to scanning.
//!
//! For each start marker the emitted block is the marker line itself, an
//! opening fence tagged with the marker's language, the normalized snippet
//! and a closing fence.
//!
//! The document is only ever produced as a whole: [`Rewriter::finish`] fails
//! if a region is left open, so callers never see a partial rewrite.

mod source;

use crate::error::{Error, Result};
use crate::marker::{Marker, MarkerSyntax};
use crate::snippet;
use tracing::{debug, trace};

pub use source::{FileSystemSource, MemorySource, SourceProvider};

/// Configuration for embedding snippets
#[derive(Debug, Clone)]
pub struct EmbedConfig {
    /// Marker grammar shared by documents and source files
    pub syntax: MarkerSyntax,
    /// Code fence written around embedded snippets (default: three backticks)
    pub fence: String,
    /// Cache source file reads within one document
    pub cache_sources: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            syntax: MarkerSyntax::default(),
            fence: "```".to_string(),
            cache_sources: true,
        }
    }
}

impl EmbedConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the marker syntax
    pub fn syntax(mut self, syntax: MarkerSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Sets the code fence
    pub fn fence(mut self, fence: impl Into<String>) -> Self {
        self.fence = fence.into();
        self
    }

    /// Enables or disables source caching
    pub fn cache_sources(mut self, enabled: bool) -> Self {
        self.cache_sources = enabled;
        self
    }
}

/// A fully rewritten document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// The rewritten lines
    pub lines: Vec<String>,
    /// For each output line, the index of the input line it was copied
    /// from; `None` for fence and snippet lines
    pub origins: Vec<Option<usize>>,
    /// Number of regions that were refreshed
    pub regions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Scanning,
    Skipping { name: String, line: usize },
}

/// Line-by-line document rewriter
pub struct Rewriter<'a, P> {
    config: &'a EmbedConfig,
    provider: &'a mut P,
    state: State,
    line_no: usize,
    regions: usize,
    output: Vec<String>,
    origins: Vec<Option<usize>>,
}

impl<'a, P: SourceProvider> Rewriter<'a, P> {
    /// Creates a rewriter in the scanning state
    pub fn new(config: &'a EmbedConfig, provider: &'a mut P) -> Self {
        Self {
            config,
            provider,
            state: State::Scanning,
            line_no: 0,
            regions: 0,
            output: Vec::new(),
            origins: Vec::new(),
        }
    }

    /// Processes the next document line
    pub fn feed(&mut self, line: &str) -> Result<()> {
        self.line_no += 1;
        let marker = self.config.syntax.parse(line);

        match self.state {
            State::Scanning => self.scan(line, marker),
            State::Skipping { .. } => {
                self.skip(line, marker);
                Ok(())
            }
        }
    }

    /// Returns true while a region is open
    pub fn is_skipping(&self) -> bool {
        matches!(self.state, State::Skipping { .. })
    }

    /// Completes the walk, failing if a region is still open
    pub fn finish(self) -> Result<Rewrite> {
        if let State::Skipping { name, line } = self.state {
            return Err(Error::unterminated_region(name, line));
        }

        Ok(Rewrite {
            lines: self.output,
            origins: self.origins,
            regions: self.regions,
        })
    }

    /// Copies the current input line to the output unchanged
    fn pass_through(&mut self, line: &str) {
        self.output.push(line.to_string());
        self.origins.push(Some(self.line_no - 1));
    }

    fn emit(&mut self, line: String) {
        self.output.push(line);
        self.origins.push(None);
    }

    fn scan(&mut self, line: &str, marker: Option<Marker<'_>>) -> Result<()> {
        match marker {
            None => {
                self.pass_through(line);
                Ok(())
            }
            Some(Marker::RegionEnd) => Err(Error::UnexpectedEndMarker { line: self.line_no }),
            Some(Marker::RegionStart {
                name,
                source_path,
                language,
            }) => {
                self.embed(line, name, source_path, language)?;
                self.state = State::Skipping {
                    name: name.to_string(),
                    line: self.line_no,
                };
                Ok(())
            }
        }
    }

    fn skip(&mut self, line: &str, marker: Option<Marker<'_>>) {
        if marker.is_some_and(|m| m.is_end()) {
            self.pass_through(line);
            self.state = State::Scanning;
        } else {
            trace!("Dropping stale line {}", self.line_no);
        }
    }

    fn embed(
        &mut self,
        line: &str,
        name: &str,
        source_path: Option<&str>,
        language: Option<&str>,
    ) -> Result<()> {
        let relative = source_path.ok_or_else(|| Error::missing_source_path(name, self.line_no))?;
        let path = self.provider.resolve(relative);
        let source = self.provider.read_lines(&path)?;

        let extracted = snippet::extract(&self.config.syntax, &source, name)
            .ok_or_else(|| Error::snippet_not_found(name, &path))?;
        let body = snippet::normalize(extracted);

        debug!(
            "Embedding '{}' from {} ({} line(s)) at line {}",
            name,
            path.display(),
            body.len(),
            self.line_no
        );

        let fence = self.config.fence.clone();
        self.pass_through(line);
        self.emit(format!("{}{}", fence, language.unwrap_or_default()));
        for text in body {
            self.emit(text.to_string());
        }
        self.emit(fence);
        self.regions += 1;
        Ok(())
    }
}

/// Rewrites a whole document, refreshing every marked region
pub fn rewrite<S, P>(lines: &[S], provider: &mut P, config: &EmbedConfig) -> Result<Rewrite>
where
    S: AsRef<str>,
    P: SourceProvider,
{
    let mut rewriter = Rewriter::new(config, provider);
    for line in lines {
        rewriter.feed(line.as_ref())?;
    }
    rewriter.finish()
}
