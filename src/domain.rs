//! Domain models for module file management.
//!
//! This module contains the value types shared by the storage layer: the
//! managed package, toolchain versions and configuration.

/// The managed dependency and its build settings.
pub mod package;
pub use package::{ModuleVersion, Package, ParseModuleVersionError};

mod config;
pub use config::{Config, DEFAULT_HOMEPAGE, Selection};

/// Toolchain versions and `go` directive rendering.
pub mod toolchain;
pub use toolchain::{InvalidToolchainVersion, ToolchainVersion, render_go_directive};
