use std::path::PathBuf;

use anyhow::Context;
use bingo_mod::{Config, ModFile, ModuleVersion, Package};
use clap::Parser;
use tracing::instrument;

#[derive(Debug, Parser)]
pub struct Set {
    /// The module file to edit
    file: PathBuf,

    /// The module to pin, as <path>@<version>
    module: ModuleVersion,

    /// Path of the tool's package relative to the module root
    #[arg(long, value_name = "PATH", default_value = "")]
    rel_path: String,

    /// Build environment overrides (KEY=VALUE), repeatable
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env)]
    envs: Vec<String>,

    /// Build flags (e.g. -tags=netgo), repeatable
    #[arg(
        long = "flag",
        value_name = "FLAG",
        allow_hyphen_values = true,
        value_parser = parse_flag
    )]
    flags: Vec<String>,
}

fn parse_env(s: &str) -> Result<String, String> {
    if s.starts_with('-') || !s.contains('=') {
        return Err(format!("'{s}' is not of the form KEY=VALUE"));
    }
    Ok(s.to_string())
}

fn parse_flag(s: &str) -> Result<String, String> {
    if !s.starts_with('-') {
        return Err(format!("'{s}' must start with '-'"));
    }
    Ok(s.to_string())
}

impl Set {
    #[instrument(skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        // the path shares the comment with envs and flags
        if self.rel_path.contains(char::is_whitespace)
            || self.rel_path.contains('=')
            || self.rel_path.starts_with('-')
        {
            anyhow::bail!("Invalid package path '{}'", self.rel_path);
        }

        let mut mod_file = ModFile::open_with(&self.file, config)
            .with_context(|| format!("Failed to open {}", self.file.display()))?;

        let package = Package::new(self.module)
            .with_rel_path(self.rel_path)
            .with_build_envs(self.envs)
            .with_build_flags(self.flags);
        let summary = package.path();
        mod_file.set_direct_require(package);

        let path = mod_file.close()?;
        println!("Pinned {summary} in {}", path.display());
        Ok(())
    }
}
