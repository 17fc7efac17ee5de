//! File-level directives encoded as comments.

/// Marker comment disabling automatic fetching of the transitive requires
/// that a tool needs.
pub const NO_DIRECTIVE_FETCH: &str = "// bingo:no_directive_fetch";

/// Returns `true` if the module file text disables automatic fetching.
///
/// Only top-level comment lines before the first `require` are considered,
/// and only an exact match of [`NO_DIRECTIVE_FETCH`] counts. Comments inside
/// `( ... )` blocks are ignored.
#[must_use]
pub fn is_auto_fetch_disabled(text: &str) -> bool {
    let mut in_block = false;

    for line in text.lines().map(str::trim) {
        if in_block {
            in_block = strip_comment(line) != ")";
            continue;
        }

        if line == NO_DIRECTIVE_FETCH {
            return true;
        }
        if is_keyword_line(line, "require") {
            return false;
        }
        in_block = strip_comment(line).ends_with('(');
    }

    false
}

/// Returns `true` if `line` starts with the given directive keyword.
pub(crate) fn is_keyword_line(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t', '(']))
}

/// Strips a trailing `//` comment and surrounding whitespace from a line.
pub(crate) fn strip_comment(line: &str) -> &str {
    line.split_once("//").map_or(line, |(code, _)| code).trim()
}
