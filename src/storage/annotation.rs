//! Build settings carried in the trailing comment of a require line.
//!
//! The module file format has no field for build settings, so they live in
//! the comment after the managed require:
//!
//! ```text
//! require github.com/prometheus/prometheus v2.4.3+incompatible // cmd/prometheus CGO_ENABLED=1 -tags=netgo
//! ```
//!
//! The comment is a whitespace separated list of tokens, each classified on
//! its own:
//! - `-tags=netgo` (leading `-`) is a build flag
//! - `CGO_ENABLED=1` (contains `=`) is a build environment override
//! - anything else is the package path relative to the module root, which may
//!   appear at most once
//!
//! Encoding always writes the relative path first, then the environment
//! overrides, then the flags.

/// The build settings decoded from a require comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    /// Package path relative to the module root. Empty for the module root.
    pub rel_path: String,
    /// Build environment overrides (`KEY=VALUE`), in order.
    pub build_envs: Vec<String>,
    /// Build flags (`-flag`), in order.
    pub build_flags: Vec<String>,
}

/// Errors that can occur when decoding a require comment.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnnotationError {
    /// More than one token looked like a relative package path.
    #[error("Ambiguous package path in comment: found both '{first}' and '{second}'")]
    DuplicateRelPath {
        /// The first path-like token.
        first: String,
        /// The offending second path-like token.
        second: String,
    },
}

enum Token<'a> {
    Flag(&'a str),
    Env(&'a str),
    Path(&'a str),
}

fn classify(token: &str) -> Token<'_> {
    if token.starts_with('-') {
        Token::Flag(token)
    } else if token.contains('=') {
        Token::Env(token)
    } else {
        Token::Path(token)
    }
}

impl Annotation {
    /// Returns `true` if no build settings are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rel_path.is_empty() && self.build_envs.is_empty() && self.build_flags.is_empty()
    }
}

/// Decodes the text of a require comment into build settings.
///
/// A leading `//` is ignored. Empty text decodes to empty settings.
///
/// # Errors
///
/// Returns [`AnnotationError::DuplicateRelPath`] if more than one token could
/// only be a relative package path.
pub fn decode(comment: &str) -> Result<Annotation, AnnotationError> {
    let comment = comment.trim();
    let comment = comment.strip_prefix("//").unwrap_or(comment);

    let mut annotation = Annotation::default();
    for token in comment.split_whitespace() {
        match classify(token) {
            Token::Flag(flag) => annotation.build_flags.push(flag.to_string()),
            Token::Env(env) => annotation.build_envs.push(env.to_string()),
            Token::Path(path) if annotation.rel_path.is_empty() => {
                annotation.rel_path = path.to_string();
            }
            Token::Path(path) => {
                return Err(AnnotationError::DuplicateRelPath {
                    first: annotation.rel_path,
                    second: path.to_string(),
                });
            }
        }
    }

    Ok(annotation)
}

/// Encodes build settings into canonical comment text, without the leading
/// `//`.
///
/// Returns an empty string if there are no settings.
#[must_use]
pub fn encode(annotation: &Annotation) -> String {
    let rel_path = (!annotation.rel_path.is_empty()).then_some(annotation.rel_path.as_str());

    rel_path
        .into_iter()
        .chain(annotation.build_envs.iter().map(String::as_str))
        .chain(annotation.build_flags.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
