use std::path::PathBuf;

mod create;
mod set;
mod show;

use bingo_mod::Config;
use clap::ArgAction;
use create::Create;
use set::Set;
use show::Show;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load(path).map_err(anyhow::Error::msg)?,
            None => Config::default(),
        };

        self.command.run(&config)
    }

    /// Installs a fmt subscriber filtered by `RUST_LOG`, with the level
    /// implied by `-v` added on top (warnings only by default).
    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show the managed tool of a module file
    Show(Show),

    /// Create a module file, from scratch or as a copy of another
    Create(Create),

    /// Pin the managed tool of a module file to a module version
    ///
    /// The build settings given here replace the existing ones entirely.
    Set(Set),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Show(command) => command.run(config)?,
            Self::Create(command) => command.run(config)?,
            Self::Set(command) => command.run(config)?,
        }
        Ok(())
    }
}
