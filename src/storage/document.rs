//! A shallow, line oriented scan of module file text.
//!
//! Only the parts this crate manages are understood: the `module` and `go`
//! directives and the `require` entries. Every other directive, including
//! `replace` and `exclude` blocks, is checked for balanced parentheses and
//! otherwise left alone.

use std::{ops::Range, sync::LazyLock};

use regex::Regex;

use super::{
    directive::{is_keyword_line, strip_comment},
    require::RequireLine,
};
use crate::domain::ModuleVersion;

// a token ends where whitespace or a `//` comment starts
static REQUIRE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>\s*require\s+)(?P<path>(?:[^\s/]|/[^\s/])+)\s+(?P<version>(?:[^\s/]|/[^\s/])+)\s*(?://(?P<comment>.*))?$")
        .expect("require line pattern is valid")
});

static REQUIRE_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>\s*)(?P<path>(?:[^\s/]|/[^\s/])+)\s+(?P<version>(?:[^\s/]|/[^\s/])+)\s*(?://(?P<comment>.*))?$")
        .expect("require entry pattern is valid")
});

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d").expect("version pattern is valid"));

/// A syntax problem found while scanning, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// The result of scanning module file text.
#[derive(Debug, Default)]
pub struct Document {
    pub module: String,
    pub go_directive: Option<String>,
    pub requires: Vec<RequireLine>,
}

struct Line<'a> {
    number: usize,
    span: Range<usize>,
    text: &'a str,
}

/// Splits text into lines with their byte spans, excluding line terminators.
fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.split_inclusive('\n')
        .scan(0, |offset, raw| {
            let start = *offset;
            *offset += raw.len();
            Some((start, raw))
        })
        .enumerate()
        .map(|(index, (start, raw))| {
            let content = raw.trim_end_matches('\n').trim_end_matches('\r');
            Line {
                number: index + 1,
                span: start..start + content.len(),
                text: content,
            }
        })
}

impl Document {
    /// Scans module file text.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if a block is left open or closed without
    /// being opened, if a require entry does not have the shape
    /// `<path> <version> [// comment]`, if a version does not start with `v`
    /// and a digit, or if the `module` directive is missing or repeated.
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        let mut document = Self::default();
        let mut module_seen = false;
        // keyword and line number of the currently open block
        let mut block: Option<(&str, usize)> = None;

        for line in lines(text) {
            let code = strip_comment(line.text);

            if let Some((keyword, _)) = block {
                if code == ")" {
                    block = None;
                } else if keyword == "require" && !code.is_empty() {
                    document
                        .requires
                        .push(parse_require(&REQUIRE_ENTRY, &line)?);
                }
                continue;
            }

            if code.is_empty() {
                continue;
            }
            if code == ")" {
                return Err(SyntaxError::new(line.number, "unexpected ')'"));
            }

            if let Some(opening) = code.strip_suffix('(') {
                let keyword = opening.trim();
                if keyword.is_empty() || keyword.contains(char::is_whitespace) {
                    return Err(SyntaxError::new(
                        line.number,
                        format!("malformed block opening: {}", line.text.trim()),
                    ));
                }
                block = Some((keyword, line.number));
                continue;
            }

            if is_keyword_line(code, "module") {
                if module_seen {
                    return Err(SyntaxError::new(line.number, "repeated module directive"));
                }
                module_seen = true;
                document.module = second_token(code).unwrap_or_default().to_string();
            } else if is_keyword_line(code, "go") {
                document.go_directive = second_token(code).map(ToString::to_string);
            } else if is_keyword_line(code, "require") {
                document
                    .requires
                    .push(parse_require(&REQUIRE_LINE, &line)?);
            }
        }

        if let Some((keyword, opened)) = block {
            return Err(SyntaxError::new(
                opened,
                format!("unterminated {keyword} block"),
            ));
        }
        if !module_seen {
            return Err(SyntaxError::new(1, "missing module directive"));
        }

        Ok(document)
    }
}

fn second_token(code: &str) -> Option<&str> {
    code.split_whitespace().nth(1)
}

fn parse_require(pattern: &Regex, line: &Line) -> Result<RequireLine, SyntaxError> {
    let captures = pattern.captures(line.text).ok_or_else(|| {
        SyntaxError::new(
            line.number,
            format!(
                "invalid require, expected <path> <version> [// comment], got: {}",
                line.text.trim()
            ),
        )
    })?;

    let version = &captures["version"];
    if !VERSION.is_match(version) {
        return Err(SyntaxError::new(
            line.number,
            format!("invalid version: {version}"),
        ));
    }

    let comment = captures
        .name("comment")
        .map_or("", |comment| comment.as_str().trim());

    Ok(RequireLine {
        module: ModuleVersion::new(&captures["path"], version),
        indirect: is_indirect(comment),
        comment: comment.to_string(),
        line: line.number,
        prefix: captures["prefix"].to_string(),
        span: line.span.clone(),
    })
}

/// The toolchain marks requires it added for transitive needs with
/// `// indirect`, optionally followed by `; <more comment>`.
fn is_indirect(comment: &str) -> bool {
    comment
        .strip_prefix("indirect")
        .is_some_and(|rest| rest.is_empty() || rest.trim_start().starts_with(';'))
}
