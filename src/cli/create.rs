use std::path::PathBuf;

use anyhow::Context;
use bingo_mod::{Config, ModFile, ToolchainVersion};
use clap::Parser;
use tracing::instrument;

#[derive(Debug, Parser)]
pub struct Create {
    /// Where to write the module file
    dest: PathBuf,

    /// An existing module file to copy
    ///
    /// If the file does not exist, a new module file is generated instead.
    #[arg(long, value_name = "FILE")]
    from: Option<PathBuf>,

    /// The version of the active Go toolchain (e.g. 1.21.3)
    #[arg(long, value_name = "VERSION")]
    go_version: ToolchainVersion,
}

impl Create {
    #[instrument(skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let mod_file = ModFile::create_from_existing_or_new(
            self.from.as_deref(),
            &self.dest,
            &self.go_version,
            config,
        )
        .with_context(|| format!("Failed to create {}", self.dest.display()))?;

        let path = mod_file.close()?;
        println!("Created {}", path.display());
        Ok(())
    }
}
