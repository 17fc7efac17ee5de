use std::path::PathBuf;

use anyhow::Context;
use bingo_mod::{Config, ModFile};
use clap::Parser;
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Display the managed tool and build settings of a module file")]
pub struct Show {
    /// The module file to read
    file: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let mod_file = ModFile::open_with(&self.file, config)
            .with_context(|| format!("Failed to open {}", self.file.display()))?;

        match self.output {
            OutputFormat::Pretty => Self::output_pretty(&mod_file),
            OutputFormat::Json => Self::output_json(&mod_file)?,
        }

        Ok(())
    }

    fn output_pretty(mod_file: &ModFile) {
        println!("File:       {}", mod_file.path().display());
        if let Some(go) = mod_file.go_directive() {
            println!("Go:         {go}");
        }
        println!(
            "Auto fetch: {}",
            if mod_file.is_directives_auto_fetch_disabled() {
                "disabled"
            } else {
                "enabled"
            }
        );

        let Some(package) = mod_file.direct_package() else {
            println!("No managed tool.");
            return;
        };

        println!();
        println!("Module:     {}", package.module);
        println!("Package:    {}", package.path());
        if !package.build_envs.is_empty() {
            println!("Envs:       {}", package.build_envs.join(" "));
        }
        if !package.build_flags.is_empty() {
            println!("Flags:      {}", package.build_flags.join(" "));
        }

        if !mod_file.indirect_requires().is_empty() {
            println!();
            println!("Indirect:");
            for module in mod_file.indirect_requires() {
                println!("  • {module}");
            }
        }
    }

    fn output_json(mod_file: &ModFile) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "path": mod_file.path().to_string_lossy(),
            "go": mod_file.go_directive(),
            "auto_fetch_disabled": mod_file.is_directives_auto_fetch_disabled(),
            "package": mod_file.direct_package(),
            "indirect": mod_file.indirect_requires(),
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
