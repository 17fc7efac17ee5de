//! Annotated single-tool Go module files
//!
//! Each tool pinned by bingo lives in its own module file. The file is a valid
//! Go module file whose one managed `require` line carries the tool's build
//! settings in a trailing comment.

pub mod domain;
pub use domain::{Config, ModuleVersion, Package, Selection, ToolchainVersion};

/// Module file parsing, editing and persistence.
pub mod storage;
pub use storage::{ModFile, ModFileError};
