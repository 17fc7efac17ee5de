//! Require entries and the rules that pick the managed one.

use std::ops::Range;

use crate::domain::{ModuleVersion, Selection};

/// One require entry of a module file, either a single `require` line or an
/// entry inside a `require ( ... )` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireLine {
    /// The required module.
    pub module: ModuleVersion,
    /// The trailing comment without the leading `//`, trimmed.
    pub comment: String,
    /// Whether the entry is marked `// indirect`.
    pub indirect: bool,
    /// The 1-based line number.
    pub line: usize,
    /// Everything before the module path: `require ` or the block indentation.
    pub(crate) prefix: String,
    /// Byte span of the line in the file text, excluding the line terminator.
    pub(crate) span: Range<usize>,
}

/// Error returned when the managed require cannot be determined.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SelectionError {
    /// The 1-based line the problem was found on.
    pub line: usize,
    /// A description of the problem.
    pub message: String,
}

/// A rule for picking the managed require out of the entries of a file.
///
/// Implement this to plug in a custom ownership convention; the built-in
/// rules are provided by [`Selection`].
pub trait SelectDirect {
    /// Picks the managed entry, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionError`] if the entries do not allow a single
    /// managed require to be chosen.
    fn select<'a>(
        &self,
        requires: &'a [RequireLine],
    ) -> Result<Option<&'a RequireLine>, SelectionError>;
}

impl SelectDirect for Selection {
    fn select<'a>(
        &self,
        requires: &'a [RequireLine],
    ) -> Result<Option<&'a RequireLine>, SelectionError> {
        let mut direct = requires.iter().filter(|require| !require.indirect);
        let first = direct.next();

        match (self, first, direct.next()) {
            (Self::Strict, Some(first), Some(second)) => Err(SelectionError {
                line: second.line,
                message: format!(
                    "only one direct require is allowed, found {} (line {}) and {}",
                    first.module, first.line, second.module
                ),
            }),
            _ => Ok(first),
        }
    }
}
