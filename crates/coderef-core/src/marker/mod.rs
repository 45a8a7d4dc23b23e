//! Marker recognition for single lines of text.
//!
//! A marker is embedded anywhere on a line and is independent of the comment
//! syntax around it. With the default [`MarkerSyntax`]:
//!
//! ```text
//! <!--coderef:example|src/lib.rs|rust-->     start, document side
//! // coderef:example-->                      start, source side
//! <!--coderef:end-->                         end
//! ```
//!
//! A line that mentions the marker token but does not fit the grammar is
//! classified as [`LineScan::Malformed`] by [`MarkerSyntax::scan`]. The
//! rewriter only ever sees [`MarkerSyntax::parse`], which folds malformed
//! markers into plain text.

use std::sync::OnceLock;
use tracing::trace;

/// A decoded marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<'a> {
    /// Opens a named region
    RegionStart {
        /// Snippet identifier
        name: &'a str,
        /// Source file, relative to the document (document markers only)
        source_path: Option<&'a str>,
        /// Tag for the emitted code fence
        language: Option<&'a str>,
    },
    /// Closes the currently open region
    RegionEnd,
}

impl<'a> Marker<'a> {
    /// Returns the snippet name for start markers
    pub fn name(&self) -> Option<&'a str> {
        match *self {
            Self::RegionStart { name, .. } => Some(name),
            Self::RegionEnd => None,
        }
    }

    /// Returns true for [`Marker::RegionEnd`]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::RegionEnd)
    }
}

/// Why a line mentioning the marker token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedMarker {
    /// No closing delimiter follows the marker token
    MissingClosingDelimiter,
    /// The marker body does not end with the terminator
    MissingTerminator,
}

/// Classification of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineScan<'a> {
    /// The line does not mention the marker token
    Plain,
    /// The line mentions the marker token but fails the grammar
    Malformed(MalformedMarker),
    /// The line carries a marker
    Marker(Marker<'a>),
}

impl<'a> LineScan<'a> {
    /// Collapses the scan into "marker or not", treating malformed markers
    /// as plain text
    pub fn into_marker(self) -> Option<Marker<'a>> {
        match self {
            Self::Marker(marker) => Some(marker),
            Self::Plain | Self::Malformed(_) => None,
        }
    }
}

/// The literal tokens making up the marker grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSyntax {
    /// Token that introduces every marker (default: `coderef:`)
    pub token: String,
    /// Keyword following the token on end markers (default: `end`)
    pub end_keyword: String,
    /// Literal that must close the marker body (default: `--`)
    pub terminator: String,
    /// Character closing the marker (default: `>`)
    pub delimiter: char,
    /// Separator between `name`, `source_path` and `language` (default: `|`)
    pub separator: char,
}

impl Default for MarkerSyntax {
    fn default() -> Self {
        Self {
            token: "coderef:".to_string(),
            end_keyword: "end".to_string(),
            terminator: "--".to_string(),
            delimiter: '>',
            separator: '|',
        }
    }
}

impl MarkerSyntax {
    /// Creates the default marker syntax
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the marker token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Sets the end keyword
    pub fn end_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.end_keyword = keyword.into();
        self
    }

    /// Sets the body terminator
    pub fn terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self
    }

    /// Sets the closing delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the field separator
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Returns true if the line mentions the marker token at all
    pub fn mentions_marker(&self, text: &str) -> bool {
        !self.token.is_empty() && text.contains(self.token.as_str())
    }

    /// Classifies a line, keeping malformed markers distinguishable
    pub fn scan<'a>(&self, line: &'a str) -> LineScan<'a> {
        if self.token.is_empty() {
            return LineScan::Plain;
        }
        let Some(token_pos) = line.find(self.token.as_str()) else {
            return LineScan::Plain;
        };

        if self.is_end_line(line) {
            return LineScan::Marker(Marker::RegionEnd);
        }

        let rest = &line[token_pos + self.token.len()..];
        let Some(close) = rest.find(self.delimiter) else {
            return LineScan::Malformed(MalformedMarker::MissingClosingDelimiter);
        };

        let Some(body) = rest[..close].strip_suffix(self.terminator.as_str()) else {
            return LineScan::Malformed(MalformedMarker::MissingTerminator);
        };

        let mut fields = body.split(self.separator);
        let name = fields.next().unwrap_or_default();
        let source_path = fields.next();
        let language = fields.next();

        LineScan::Marker(Marker::RegionStart {
            name,
            source_path,
            language,
        })
    }

    /// Parses a line into a marker; malformed markers count as plain text
    pub fn parse<'a>(&self, line: &'a str) -> Option<Marker<'a>> {
        let scan = self.scan(line);
        if let LineScan::Malformed(reason) = scan {
            trace!("Treating malformed marker as plain text ({:?}): {}", reason, line);
        }
        scan.into_marker()
    }

    /// End markers are the token, the end keyword and the terminator
    /// immediately followed by the delimiter
    fn is_end_line(&self, line: &str) -> bool {
        line.match_indices(self.token.as_str()).any(|(pos, token)| {
            line[pos + token.len()..]
                .strip_prefix(self.end_keyword.as_str())
                .and_then(|r| r.strip_prefix(self.terminator.as_str()))
                .is_some_and(|r| r.starts_with(self.delimiter))
        })
    }
}

/// Parses a line with the default [`MarkerSyntax`]
pub fn parse(line: &str) -> Option<Marker<'_>> {
    static DEFAULT: OnceLock<MarkerSyntax> = OnceLock::new();
    DEFAULT.get_or_init(MarkerSyntax::default).parse(line)
}
