use std::{fmt, str::FromStr};

use serde::Serialize;

/// A module import path paired with a version.
///
/// The version is kept as an opaque token. Pseudo-versions
/// (`v0.0.0-20170110192607-30d10be49292`) and `+incompatible` suffixes are
/// carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ModuleVersion {
    /// The module import path (e.g. `github.com/prometheus/prometheus`).
    pub path: String,
    /// The module version (e.g. `v2.4.3+incompatible`).
    pub version: String,
}

impl ModuleVersion {
    /// Creates a new module/version pair.
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.version)
    }
}

/// Error returned when a string is not of the form `path@version`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid module version '{0}': expected <path>@<version>")]
pub struct ParseModuleVersionError(String);

impl FromStr for ModuleVersion {
    type Err = ParseModuleVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('@') {
            Some((path, version)) if !path.is_empty() && !version.is_empty() => {
                Ok(Self::new(path, version))
            }
            _ => Err(ParseModuleVersionError(s.to_string())),
        }
    }
}

/// The single managed dependency of a module file.
///
/// A package is a module pinned at a version, plus the build settings that
/// are recorded next to it: the package path inside the module, the build
/// flags, and the build environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Package {
    /// The pinned module.
    pub module: ModuleVersion,
    /// Path of the built package relative to the module root. Empty means the
    /// module root itself.
    pub rel_path: String,
    /// Build flags such as `-tags=netgo`, in order.
    pub build_flags: Vec<String>,
    /// Build environment overrides such as `CGO_ENABLED=0`, in order.
    pub build_envs: Vec<String>,
}

impl Package {
    /// Creates a package for the module root with no build settings.
    #[must_use]
    pub const fn new(module: ModuleVersion) -> Self {
        Self {
            module,
            rel_path: String::new(),
            build_flags: Vec::new(),
            build_envs: Vec::new(),
        }
    }

    /// Sets the package path relative to the module root.
    #[must_use]
    pub fn with_rel_path(mut self, rel_path: impl Into<String>) -> Self {
        self.rel_path = rel_path.into();
        self
    }

    /// Sets the build flags.
    #[must_use]
    pub fn with_build_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_flags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the build environment overrides.
    #[must_use]
    pub fn with_build_envs<I, S>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_envs = envs.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if the package carries any build settings.
    #[must_use]
    pub fn has_metadata(&self) -> bool {
        !self.rel_path.is_empty() || !self.build_flags.is_empty() || !self.build_envs.is_empty()
    }

    /// The full import path of the package that gets built.
    ///
    /// For example:
    /// - `github.com/x/y` for a package at the module root
    /// - `github.com/x/y/cmd/z` for a package with relative path `cmd/z`
    #[must_use]
    pub fn path(&self) -> String {
        if self.rel_path.is_empty() {
            self.module.path.clone()
        } else {
            format!("{}/{}", self.module.path, self.rel_path)
        }
    }
}
