//! Reading and writing module files.
//!
//! The [`ModFile`] handle ties together the line scanner, the require
//! selection rules, the comment codec for build settings and the directive
//! scanner.

/// Build settings carried in require comments.
pub mod annotation;
/// File-level directive comments.
pub mod directive;
mod document;
pub mod modfile;
pub mod require;

pub use annotation::{Annotation, AnnotationError};
pub use directive::{NO_DIRECTIVE_FETCH, is_auto_fetch_disabled};
pub use modfile::{Error as ModFileError, ModFile};
pub use require::{RequireLine, SelectDirect, SelectionError};
