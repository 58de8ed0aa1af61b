//! Init command implementation
//!
//! Writes a starter configuration file, prompting for the base directory.
//! Refuses to overwrite an existing file unless `--force` is passed.

use anyhow::Result;
use clap::Args;
use console::style;
use dialoguer::Input;

use repo_scout::Config;

use super::Context;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,

    /// Accept defaults without prompting
    #[arg(short, long)]
    pub yes: bool,
}

pub fn execute(ctx: &Context, args: InitArgs) -> Result<()> {
    let path = ctx
        .config_path
        .clone()
        .unwrap_or_else(Config::default_path);

    if path.exists() && !args.force {
        anyhow::bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let mut config = Config::scaffold();
    if !args.yes {
        let base_dir: String = Input::new()
            .with_prompt("Base directory for repositories")
            .default(config.base_dir.to_string_lossy().into_owned())
            .interact_text()?;
        config.base_dir = base_dir.into();
    }

    config.save(&path)?;
    println!(
        "{} {}",
        style("Configuration written to").bold(),
        path.display()
    );
    println!("Edit it to map accounts and organizations to folders.");
    Ok(())
}
