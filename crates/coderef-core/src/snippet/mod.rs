//! Snippet extraction from marked source files.
//!
//! A snippet is the run of lines between a start marker carrying the
//! requested name and the next end marker. Markers do not nest: the first
//! end marker after the start closes the snippet, whatever lies between.
//!
//! [`normalize`] then removes the indentation the snippet had in its source.

mod indent;

use crate::marker::{Marker, MarkerSyntax};
use tracing::trace;

pub use indent::{common_indent, normalize};

/// Locates the snippet `name` in `source_lines` and returns its inner lines.
///
/// Only the first start marker with a matching name is considered. Returns
/// `None` if no such marker exists or if it is never closed; a missing
/// snippet is never reported as an empty one.
pub fn extract<'s, S: AsRef<str>>(
    syntax: &MarkerSyntax,
    source_lines: &'s [S],
    name: &str,
) -> Option<&'s [S]> {
    let start = source_lines.iter().position(|line| {
        matches!(
            syntax.parse(line.as_ref()),
            Some(Marker::RegionStart { name: found, .. }) if found == name
        )
    })?;
    trace!("Snippet '{}' starts after source line {}", name, start + 1);

    let body = &source_lines[start + 1..];
    let len = body
        .iter()
        .position(|line| syntax.parse(line.as_ref()).is_some_and(|m| m.is_end()))?;
    trace!("Snippet '{}' spans {} line(s)", name, len);

    Some(&body[..len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn find<'s>(lines: &'s [&'s str], name: &str) -> Option<&'s [&'s str]> {
        extract(&MarkerSyntax::default(), lines, name)
    }

    #[test]
    fn test_extract_simple() {
        let source = [
            "<!--coderef:example-->",
            "var a = 1;",
            "var b = 2;",
            "<!--coderef:end-->",
        ];
        assert_eq!(find(&source, "example"), Some(&source[1..3]));
    }

    #[test]
    fn test_extract_picks_named_region() {
        let source = [
            "// <!--coderef:first-->",
            "one();",
            "// <!--coderef:end-->",
            "between();",
            "// <!--coderef:second-->",
            "two();",
            "// <!--coderef:end-->",
        ];
        assert_eq!(find(&source, "second"), Some(&["two();"][..]));
    }

    #[test]
    fn test_first_matching_start_is_authoritative() {
        let source = [
            "<!--coderef:dup-->",
            "first",
            "<!--coderef:end-->",
            "<!--coderef:dup-->",
            "second",
            "<!--coderef:end-->",
        ];
        assert_eq!(find(&source, "dup"), Some(&["first"][..]));
    }

    #[test]
    fn test_no_nesting() {
        let source = [
            "<!--coderef:outer-->",
            "a",
            "<!--coderef:inner-->",
            "b",
            "<!--coderef:end-->",
            "c",
            "<!--coderef:end-->",
        ];
        // The inner start marker is carried as content and the first end closes
        assert_eq!(
            find(&source, "outer"),
            Some(&["a", "<!--coderef:inner-->", "b"][..])
        );
    }

    #[test]
    fn test_empty_snippet() {
        let source = ["<!--coderef:empty-->", "<!--coderef:end-->"];
        assert_eq!(find(&source, "empty"), Some(&[][..]));
    }

    #[test]
    fn test_missing_snippet() {
        let source = ["<!--coderef:other-->", "x", "<!--coderef:end-->"];
        assert_eq!(find(&source, "example"), None);
    }

    #[test]
    fn test_unterminated_snippet() {
        let source = ["<!--coderef:example-->", "var a = 1;"];
        assert_eq!(find(&source, "example"), None);
    }

    #[test]
    fn test_malformed_start_is_not_a_match() {
        let source = ["<!--coderef:example>", "x", "<!--coderef:end-->"];
        assert_eq!(find(&source, "example"), None);
    }

    #[test]
    fn test_extract_then_normalize() {
        let source = [
            "    // <!--coderef:indented-->",
            "    if ok {",
            "",
            "    run();",
            "  }",
            "    // <!--coderef:end-->",
        ];
        let snippet = find(&source, "indented").unwrap();
        assert_eq!(normalize(snippet), vec!["  if ok {", "", "  run();", "}"]);
    }
}
