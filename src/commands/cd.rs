//! Cd command implementation
//!
//! Resolves a repository name to its path using the saved index and prints
//! the path on stdout, so a shell function can `cd "$(repo-scout cd name)"`.
//! Everything else goes to stderr to keep stdout clean for the shell.

use anyhow::Result;
use clap::Args;

use repo_scout::error::Error;
use repo_scout::scanner;

use super::Context;

/// Arguments for the cd command
#[derive(Args, Debug)]
pub struct CdArgs {
    /// Repository name (exact, trailing path segment, or suffix)
    #[arg(value_name = "NAME")]
    pub name: String,
}

pub fn execute(ctx: &Context, args: CdArgs) -> Result<()> {
    let scanner = ctx.scanner()?;
    let repos = scanner.load_index()?;
    if repos.is_empty() {
        eprintln!("Index is empty, run 'repo-scout scan' first");
    }

    match scanner::find_repository(&repos, &args.name) {
        Some(repo) => {
            println!("{}", repo.path.display());
            Ok(())
        }
        None => Err(Error::RepoNotFound {
            name: args.name,
        }
        .into()),
    }
}
