//! Common-indentation removal for extracted snippets.
//!
//! The shared prefix is computed by literal character equality; tabs and
//! spaces are never treated as interchangeable.

/// Returns true if the line is empty or whitespace only
fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

/// Leading whitespace run of a line
fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(line.len(), |(i, _)| i);
    &line[..end]
}

/// Longest leading-whitespace string shared by all non-blank lines.
///
/// Blank lines do not take part. With no qualifying line the prefix is empty.
pub fn common_indent<S: AsRef<str>>(lines: &[S]) -> &str {
    let mut qualifying = lines
        .iter()
        .map(|l| l.as_ref())
        .filter(|l: &&str| !is_blank(l))
        .map(leading_whitespace);

    let Some(first) = qualifying.next() else {
        return "";
    };

    qualifying.fold(first, |prefix, other| {
        let matched = prefix
            .char_indices()
            .zip(other.chars())
            .find(|((_, a), b)| a != b)
            .map_or_else(
                || prefix.len().min(other.len()),
                |((i, _), _)| i,
            );
        &prefix[..matched]
    })
}

/// Removes up to `count` leading characters, emptying shorter lines
fn strip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((i, _)) => &line[i..],
        None => "",
    }
}

/// Strips the common indentation from every line of a block.
///
/// Each line, blank lines included, loses as many leading characters as the
/// prefix returned by [`common_indent`] holds.
pub fn normalize<S: AsRef<str>>(lines: &[S]) -> Vec<&str> {
    let width = common_indent(lines).chars().count();
    lines
        .iter()
        .map(|l| strip_chars(l.as_ref(), width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_qualifying_lines() {
        let lines: [&str; 0] = [];
        assert_eq!(common_indent(&lines), "");
        assert_eq!(common_indent(&["", "   ", "\t"]), "");
    }

    #[test]
    fn test_single_line_prefix_is_its_whitespace() {
        assert_eq!(common_indent(&["", "\t  code();", "   "]), "\t  ");
        assert_eq!(normalize(&["\t  code();"]), vec!["code();"]);
    }

    #[test]
    fn test_mixed_indentation() {
        let lines = ["    if x {", "", "    y();", "  }"];
        assert_eq!(common_indent(&lines), "  ");
        assert_eq!(normalize(&lines), vec!["  if x {", "", "  y();", "}"]);
    }

    #[test]
    fn test_relative_indentation_preserved() {
        let lines = [
            "        fn main() {",
            "            println!(\"hi\");",
            "        }",
        ];
        assert_eq!(
            normalize(&lines),
            vec!["fn main() {", "    println!(\"hi\");", "}"]
        );
    }

    #[test]
    fn test_tabs_and_spaces_are_distinct() {
        let lines = ["\tone", "    two"];
        assert_eq!(common_indent(&lines), "");
        assert_eq!(normalize(&lines), vec!["\tone", "    two"]);

        let lines = ["  \tone", "  two"];
        assert_eq!(common_indent(&lines), "  ");
    }

    #[test]
    fn test_blank_lines_are_clamped() {
        let lines = ["      a", " ", "      b", "         "];
        assert_eq!(normalize(&lines), vec!["a", "", "b", "   "]);
    }

    #[test]
    fn test_unindented_block_unchanged() {
        let lines = ["var a = 1;", "var b = 2;"];
        assert_eq!(normalize(&lines), vec!["var a = 1;", "var b = 2;"]);
    }

    #[test]
    fn test_owned_strings() {
        let lines = vec!["  a".to_string(), "    b".to_string()];
        assert_eq!(normalize(&lines), vec!["a", "  b"]);
    }
}
