//! An open, mutable module file holding one managed tool.
//!
//! A [`ModFile`] is acquired with [`ModFile::open`] or
//! [`ModFile::create_from_existing_or_new`], changed in memory with
//! [`ModFile::set_direct_require`], and written exactly once by
//! [`ModFile::close`], which consumes the handle.
//!
//! Only the managed require line is ever rewritten. Every other byte of the
//! file, including `replace` blocks, comments and indirect requires, is
//! written back as it was read.

use std::{
    fs, io,
    ops::Range,
    path::{Path, PathBuf},
};

use tracing::instrument;

use super::{
    annotation::{self, Annotation},
    directive::is_auto_fetch_disabled,
    document::Document,
    require::SelectDirect,
};
use crate::domain::{Config, ModuleVersion, Package, ToolchainVersion, render_go_directive};

/// Errors that can occur when opening, creating or closing a module file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The module file does not exist.
    #[error("Module file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The module file exists but could not be read.
    #[error("Failed to read module file {}", path.display())]
    Read {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The module file is not well formed.
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        /// The malformed file.
        path: PathBuf,
        /// The 1-based line the problem was found on.
        line: usize,
        /// A description of the problem.
        message: String,
    },

    /// The module file could not be written.
    #[error("Failed to write module file {}", path.display())]
    Write {
        /// The file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Where the managed require line sits in the original text.
#[derive(Debug, Clone)]
struct Slot {
    span: Range<usize>,
    prefix: String,
}

/// An open module file.
///
/// The handle owns the full file text and the managed [`Package`]. Changes
/// stay in memory until [`ModFile::close`] writes them to [`ModFile::path`].
/// Dropping a handle with unsaved changes discards them.
#[derive(Debug)]
pub struct ModFile {
    /// Where the file is written on close.
    path: PathBuf,
    /// The file text as read or generated.
    text: String,
    /// The managed require line, if the text has one.
    slot: Option<Slot>,
    /// The managed package as decoded from `text`.
    opened: Option<Package>,
    direct: Option<Package>,
    indirect: Vec<ModuleVersion>,
    go_directive: Option<String>,
    auto_fetch_disabled: bool,
    /// Whether the in-memory state differs from what is on disk at `path`.
    dirty: bool,
}

impl ModFile {
    /// Opens an existing module file using the default [`Config`].
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the file does not exist ([`Error::NotFound`])
    /// - the file cannot be read ([`Error::Read`])
    /// - the file is malformed, or its managed require cannot be decoded
    ///   ([`Error::Parse`])
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::open_with(path, &Config::default())
    }

    /// Opens an existing module file, selecting the managed require according
    /// to the given configuration.
    ///
    /// # Errors
    ///
    /// See [`ModFile::open`].
    pub fn open_with(path: impl AsRef<Path>, config: &Config) -> Result<Self, Error> {
        Self::open_with_selector(path, &config.selection)
    }

    /// Opens an existing module file, selecting the managed require with a
    /// custom rule.
    ///
    /// # Errors
    ///
    /// See [`ModFile::open`]. A selector error is reported as
    /// [`Error::Parse`].
    pub fn open_with_selector(
        path: impl AsRef<Path>,
        selector: &dyn SelectDirect,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let mod_file = Self::from_text(path.to_path_buf(), text, selector)?;
        tracing::debug!(
            "Opened {} (direct: {:?}, auto fetch disabled: {})",
            path.display(),
            mod_file.direct.as_ref().map(|pkg| pkg.module.to_string()),
            mod_file.auto_fetch_disabled
        );
        Ok(mod_file)
    }

    /// Creates a module file at `dest`, either as a copy of `source` or from
    /// scratch.
    ///
    /// If `source` is given and exists, it is parsed, copied byte for byte to
    /// `dest`, and the copy is opened; `source` itself is never modified.
    /// Otherwise a new file is prepared in memory containing only the
    /// generated header and a `go` directive matching `toolchain`. Nothing is
    /// written for a new file until [`ModFile::close`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] or [`Error::Parse`] if the source cannot be
    /// opened, and [`Error::Write`] if it cannot be copied to `dest`.
    pub fn create_from_existing_or_new(
        source: Option<&Path>,
        dest: impl AsRef<Path>,
        toolchain: &ToolchainVersion,
        config: &Config,
    ) -> Result<Self, Error> {
        let dest = dest.as_ref();

        let Some(source) = source.filter(|source| source.exists()) else {
            tracing::debug!("Creating new module file for {}", dest.display());
            return Ok(Self::new(dest.to_path_buf(), toolchain, config));
        };

        let mut mod_file = Self::open_with(source, config)?;
        if !is_same_file(source, dest) {
            fs::copy(source, dest).map_err(|source| Error::Write {
                path: dest.to_path_buf(),
                source,
            })?;
            tracing::debug!("Copied {} to {}", source.display(), dest.display());
            mod_file.path = dest.to_path_buf();
        }
        Ok(mod_file)
    }

    fn new(path: PathBuf, toolchain: &ToolchainVersion, config: &Config) -> Self {
        let go_directive = render_go_directive(toolchain);
        let text = format!("{}\n\ngo {go_directive}\n", config.header());

        Self {
            path,
            text,
            slot: None,
            opened: None,
            direct: None,
            indirect: Vec::new(),
            go_directive: Some(go_directive),
            auto_fetch_disabled: false,
            dirty: true,
        }
    }

    fn from_text(path: PathBuf, text: String, selector: &dyn SelectDirect) -> Result<Self, Error> {
        let parse_error = |line: usize, message: String| Error::Parse {
            path: path.clone(),
            line,
            message,
        };

        let document =
            Document::parse(&text).map_err(|error| parse_error(error.line, error.message))?;
        let selected = selector
            .select(&document.requires)
            .map_err(|error| parse_error(error.line, error.message))?;

        let (slot, direct) = match selected {
            Some(require) => {
                let Annotation {
                    rel_path,
                    build_envs,
                    build_flags,
                } = annotation::decode(&require.comment)
                    .map_err(|error| parse_error(require.line, error.to_string()))?;
                let package = Package {
                    module: require.module.clone(),
                    rel_path,
                    build_flags,
                    build_envs,
                };
                let slot = Slot {
                    span: require.span.clone(),
                    prefix: require.prefix.clone(),
                };
                (Some(slot), Some(package))
            }
            None => (None, None),
        };

        let indirect = document
            .requires
            .iter()
            .filter(|require| require.indirect)
            .map(|require| require.module.clone())
            .collect();

        Ok(Self {
            auto_fetch_disabled: is_auto_fetch_disabled(&text),
            path,
            text,
            slot,
            opened: direct.clone(),
            direct,
            indirect,
            go_directive: document.go_directive,
            dirty: false,
        })
    }

    /// The path the file is written to on close.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The managed package, if the file has one.
    #[must_use]
    pub const fn direct_package(&self) -> Option<&Package> {
        self.direct.as_ref()
    }

    /// Whether automatic fetching of the tool's transitive requires is
    /// disabled by a directive comment.
    ///
    /// This is fixed when the file is opened.
    #[must_use]
    pub const fn is_directives_auto_fetch_disabled(&self) -> bool {
        self.auto_fetch_disabled
    }

    /// The version on the `go` directive line, if present.
    #[must_use]
    pub fn go_directive(&self) -> Option<&str> {
        self.go_directive.as_deref()
    }

    /// Requires marked `// indirect`. These are passed through unchanged.
    #[must_use]
    pub fn indirect_requires(&self) -> &[ModuleVersion] {
        &self.indirect
    }

    /// Replaces the managed package.
    ///
    /// Only the in-memory state changes; the file is written by
    /// [`ModFile::close`]. No validation is performed on the package.
    pub fn set_direct_require(&mut self, package: Package) {
        if self.direct.as_ref() == Some(&package) {
            return;
        }
        tracing::debug!("Setting direct require of {} to {}", self.path.display(), package.module);
        self.direct = Some(package);
        self.dirty = true;
    }

    /// Returns the text that [`ModFile::close`] would write.
    ///
    /// The managed require line is only regenerated if the package differs
    /// from the one the file was opened with.
    #[must_use]
    pub fn render(&self) -> String {
        let Some(package) = self.direct.as_ref().filter(|pkg| Some(*pkg) != self.opened.as_ref())
        else {
            return self.text.clone();
        };

        match &self.slot {
            Some(Slot { span, prefix }) => {
                let mut out = String::with_capacity(self.text.len());
                out.push_str(&self.text[..span.start]);
                out.push_str(&require_line(prefix, package));
                out.push_str(&self.text[span.end..]);
                out
            }
            None => {
                let mut out = self.text.clone();
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push('\n');
                out.push_str(&require_line("require ", package));
                out.push('\n');
                out
            }
        }
    }

    /// Writes the file to [`ModFile::path`], overwriting it completely, and
    /// releases the handle.
    ///
    /// Returns the path that was written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the file cannot be written. The previous
    /// content of the file may be lost in that case.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn close(mut self) -> Result<PathBuf, Error> {
        let result = fs::write(&self.path, self.render());
        // the handle is consumed either way
        self.dirty = false;

        result.map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!("Wrote {}", self.path.display());
        Ok(std::mem::take(&mut self.path))
    }
}

impl Drop for ModFile {
    fn drop(&mut self) {
        if self.dirty {
            tracing::warn!(
                "Module file {} dropped without close; changes discarded",
                self.path.display()
            );
        }
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn require_line(prefix: &str, package: &Package) -> String {
    let annotation = annotation::encode(&Annotation {
        rel_path: package.rel_path.clone(),
        build_envs: package.build_envs.clone(),
        build_flags: package.build_flags.clone(),
    });

    let ModuleVersion { path, version } = &package.module;
    if annotation.is_empty() {
        format!("{prefix}{path} {version}")
    } else {
        format!("{prefix}{path} {version} // {annotation}")
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::Selection;

    const SKELETON: &str = "module _ // Auto generated by https://github.com/bwplotka/bingo. DO NOT EDIT\n\ngo 1.14\n";

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn best() -> Package {
        Package::new(ModuleVersion::new("github.com/yolo/best/v100", "v100.0.0"))
    }

    #[test]
    fn open_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = ModFile::open(dir.path().join("missing.mod"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn open_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.mod", "module _\n\nrequire a\n");
        let result = ModFile::open(&path);
        assert!(matches!(result, Err(Error::Parse { line: 3, .. })));
    }

    #[test]
    fn open_with_ambiguous_comment() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.mod", "module _\n\nrequire a v1.0.0 // cmd/a cmd/b\n");
        let error = ModFile::open(&path).unwrap_err();
        assert!(matches!(error, Error::Parse { line: 3, .. }));
        assert!(error.to_string().contains("cmd/b"));
    }

    #[test]
    fn open_without_require() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tool.mod", SKELETON);
        let mod_file = ModFile::open(&path).unwrap();
        assert_eq!(mod_file.direct_package(), None);
        assert_eq!(mod_file.go_directive(), Some("1.14"));
        assert_eq!(mod_file.render(), SKELETON);
    }

    #[test]
    fn set_direct_require_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tool.mod", &format!("{SKELETON}\nrequire a v1.0.0\n"));
        let mut mod_file = ModFile::open(&path).unwrap();
        let current = mod_file.direct_package().cloned().unwrap();

        mod_file.set_direct_require(current);
        assert!(!mod_file.dirty);

        mod_file.set_direct_require(best());
        mod_file.set_direct_require(best());
        assert!(mod_file.dirty);
        assert_eq!(mod_file.direct_package(), Some(&best()));
    }

    #[test]
    fn unchanged_package_keeps_line_verbatim() {
        let dir = TempDir::new().unwrap();
        let original = format!("{SKELETON}\nrequire x v1.0.0   //   -trimpath   cmd/x\n");
        let path = write(&dir, "tool.mod", &original);

        let mut mod_file = ModFile::open(&path).unwrap();
        assert_eq!(mod_file.render(), original);

        mod_file.set_direct_require(best());
        let reverted = Package::new(ModuleVersion::new("x", "v1.0.0"))
            .with_rel_path("cmd/x")
            .with_build_flags(["-trimpath"]);
        mod_file.set_direct_require(reverted);
        assert_eq!(mod_file.render(), original);
    }

    #[test]
    fn rewrite_keeps_surrounding_text() {
        let dir = TempDir::new().unwrap();
        let original = format!(
            "{SKELETON}\nrequire github.com/a/b v1.0.0 // cmd/b\n\nreplace github.com/x/y => ../y\n"
        );
        let path = write(&dir, "tool.mod", &original);

        let mut mod_file = ModFile::open(&path).unwrap();
        mod_file.set_direct_require(
            Package::new(ModuleVersion::new("github.com/a/b", "v1.1.0"))
                .with_rel_path("cmd/b")
                .with_build_flags(["-trimpath"]),
        );

        assert_eq!(
            mod_file.render(),
            format!(
                "{SKELETON}\nrequire github.com/a/b v1.1.0 // cmd/b -trimpath\n\nreplace github.com/x/y => ../y\n"
            )
        );
    }

    #[test]
    fn rewrite_inside_require_block() {
        let dir = TempDir::new().unwrap();
        let original = format!(
            "{SKELETON}\nrequire (\n\tgithub.com/a/b v1.0.0\n\tgithub.com/c/d v0.3.0 // indirect\n)\n"
        );
        let path = write(&dir, "tool.mod", &original);

        let mut mod_file = ModFile::open(&path).unwrap();
        assert_eq!(
            mod_file.indirect_requires(),
            &[ModuleVersion::new("github.com/c/d", "v0.3.0")]
        );
        mod_file.set_direct_require(
            Package::new(ModuleVersion::new("github.com/a/b", "v1.2.0")).with_rel_path("cmd/b"),
        );

        assert_eq!(
            mod_file.render(),
            format!(
                "{SKELETON}\nrequire (\n\tgithub.com/a/b v1.2.0 // cmd/b\n\tgithub.com/c/d v0.3.0 // indirect\n)\n"
            )
        );
    }

    #[test]
    fn append_to_text_without_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tool.mod", "module _\n\ngo 1.14");
        let mut mod_file = ModFile::open(&path).unwrap();
        mod_file.set_direct_require(best());
        assert_eq!(
            mod_file.render(),
            "module _\n\ngo 1.14\n\nrequire github.com/yolo/best/v100 v100.0.0\n"
        );
    }

    #[test]
    fn selection_from_config() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "tool.mod",
            &format!("{SKELETON}\nrequire a v1.0.0\nrequire b v2.0.0\n"),
        );

        assert!(matches!(ModFile::open(&path), Err(Error::Parse { line: 6, .. })));

        let config = Config {
            selection: Selection::First,
            ..Config::default()
        };
        let mod_file = ModFile::open_with(&path, &config).unwrap();
        assert_eq!(
            mod_file.direct_package().map(|pkg| &pkg.module),
            Some(&ModuleVersion::new("a", "v1.0.0"))
        );
    }

    #[test]
    fn create_new_uses_configured_homepage() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            homepage: "https://example.com/pin".to_string(),
            ..Config::default()
        };
        let mod_file = ModFile::create_from_existing_or_new(
            None,
            dir.path().join("tool.mod"),
            &ToolchainVersion::new(1, 22, 1),
            &config,
        )
        .unwrap();

        assert_eq!(
            mod_file.render(),
            "module _ // Auto generated by https://example.com/pin. DO NOT EDIT\n\ngo 1.22.1\n"
        );
        assert!(!mod_file.is_directives_auto_fetch_disabled());
        assert!(!dir.path().join("tool.mod").exists());
    }

    #[test]
    fn create_does_not_copy_malformed_source() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "bad.mod", "go 1.14\n");
        let dest = dir.path().join("dest.mod");

        let result = ModFile::create_from_existing_or_new(
            Some(source.as_path()),
            &dest,
            &ToolchainVersion::new(1, 14, 0),
            &Config::default(),
        );
        assert!(matches!(result, Err(Error::Parse { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn close_reports_write_failure() {
        let dir = TempDir::new().unwrap();
        let mod_file = ModFile::create_from_existing_or_new(
            None,
            dir.path().join("missing-dir").join("tool.mod"),
            &ToolchainVersion::new(1, 21, 0),
            &Config::default(),
        )
        .unwrap();

        assert!(matches!(mod_file.close(), Err(Error::Write { .. })));
    }

    #[test]
    fn close_returns_written_path() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("tool.mod");
        let mod_file = ModFile::create_from_existing_or_new(
            None,
            &dest,
            &ToolchainVersion::new(1, 21, 0),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(mod_file.path(), dest);

        assert_eq!(mod_file.close().unwrap(), dest);
        assert!(dest.exists());
    }
}
