//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// repo-scout - Keep a directory of git clones under control
#[derive(Parser, Debug)]
#[command(name = "repo-scout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(long, global = true, value_name = "PATH", env = "REPO_SCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of concurrent git workers (0 uses the default)
    #[arg(long, global = true, value_name = "N", default_value_t = 0)]
    pub workers: usize,

    /// Suppress progress and summary output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show working-tree and sync status for every repository
    Status(commands::status::StatusArgs),

    /// Discover repositories and rebuild the index
    Scan(commands::scan::ScanArgs),

    /// Fetch remotes for every repository with one configured
    Fetch(commands::fetch::FetchArgs),

    /// Move repositories into the configured folder layout
    Organize(commands::organize::OrganizeArgs),

    /// Clone a repository into its place in the layout
    Clone(commands::clone::CloneArgs),

    /// Print the path of a repository by name (for shell `cd` wrappers)
    Cd(commands::cd::CdArgs),

    /// Create a starter configuration file
    Init(commands::init::InitArgs),

    /// Show the active configuration
    Config(commands::config::ConfigArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();

        match self.color.as_str() {
            "always" => console::set_colors_enabled(true),
            "never" => console::set_colors_enabled(false),
            _ => {}
        }

        let ctx = commands::Context {
            config_path: self.config,
            workers: self.workers,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Status(args) => commands::status::execute(&ctx, args).await,
            Commands::Scan(args) => commands::scan::execute(&ctx, args).await,
            Commands::Fetch(args) => commands::fetch::execute(&ctx, args).await,
            Commands::Organize(args) => commands::organize::execute(&ctx, args).await,
            Commands::Clone(args) => commands::clone::execute(&ctx, args).await,
            Commands::Cd(args) => commands::cd::execute(&ctx, args),
            Commands::Init(args) => commands::init::execute(&ctx, args),
            Commands::Config(args) => commands::config::execute(&ctx, args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
