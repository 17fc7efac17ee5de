//! Toolchain versions and the `go` directive they imply.
//!
//! Newly created module files must look exactly like the ones the active
//! toolchain would generate itself. Starting with Go 1.21 the toolchain writes
//! the full version into the `go` directive (`go 1.21.0`); earlier toolchains
//! write only `major.minor` (`go 1.14`).

use std::{fmt, str::FromStr};

use semver::{Prerelease, Version};

/// The first release line that writes a full version into the `go` directive.
const FULL_DIRECTIVE_SINCE: (u64, u64) = (1, 21);

/// A version of the Go toolchain.
///
/// Ordering follows semantic versioning, so `1.21rc2 < 1.21.0 < 1.21.1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolchainVersion(Version);

impl ToolchainVersion {
    /// Creates a release version.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// The major version component.
    #[must_use]
    pub const fn major(&self) -> u64 {
        self.0.major
    }

    /// The minor version component.
    #[must_use]
    pub const fn minor(&self) -> u64 {
        self.0.minor
    }

    /// The patch version component.
    #[must_use]
    pub const fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Returns the underlying semantic version.
    #[must_use]
    pub const fn as_semver(&self) -> &Version {
        &self.0
    }
}

impl From<Version> for ToolchainVersion {
    fn from(version: Version) -> Self {
        Self(version)
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Version {
            major,
            minor,
            patch,
            pre,
            ..
        } = &self.0;
        if pre.is_empty() {
            write!(f, "{major}.{minor}.{patch}")
        } else if *patch == 0 {
            // Toolchain release candidates are spelled `1.22rc1`.
            write!(f, "{major}.{minor}{pre}")
        } else {
            write!(f, "{major}.{minor}.{patch}-{pre}")
        }
    }
}

/// Error returned when a string is not a recognisable toolchain version.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid toolchain version '{0}': expected e.g. 1.21.3, go1.14 or 1.22rc1")]
pub struct InvalidToolchainVersion(String);

impl FromStr for ToolchainVersion {
    type Err = InvalidToolchainVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidToolchainVersion(s.to_string());

        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix("go").unwrap_or(trimmed);

        let (release, pre) = match trimmed.find(|c: char| c == '-' || c.is_ascii_alphabetic()) {
            Some(idx) => {
                let (release, pre) = trimmed.split_at(idx);
                (release, pre.trim_start_matches('-'))
            }
            None => (trimmed, ""),
        };

        let components = release
            .split('.')
            .map(str::parse::<u64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        let (major, minor, patch) = match components.as_slice() {
            [major] => (*major, 0, 0),
            [major, minor] => (*major, *minor, 0),
            [major, minor, patch] => (*major, *minor, *patch),
            _ => return Err(invalid()),
        };

        let mut version = Version::new(major, minor, patch);
        if !pre.is_empty() {
            version.pre = Prerelease::new(pre).map_err(|_| invalid())?;
        }

        Ok(Self(version))
    }
}

/// Renders the version string written after `go` in a new module file.
///
/// Toolchains before 1.21 write `major.minor`; 1.21 and later (release
/// candidates included) write the full version.
///
/// ```
/// use bingo_mod::domain::{render_go_directive, ToolchainVersion};
///
/// assert_eq!(render_go_directive(&ToolchainVersion::new(1, 14, 7)), "1.14");
/// assert_eq!(render_go_directive(&ToolchainVersion::new(1, 21, 3)), "1.21.3");
/// ```
#[must_use]
pub fn render_go_directive(toolchain: &ToolchainVersion) -> String {
    if (toolchain.major(), toolchain.minor()) < FULL_DIRECTIVE_SINCE {
        format!("{}.{}", toolchain.major(), toolchain.minor())
    } else {
        toolchain.to_string()
    }
}
