//! CLI for bulk PAN-DB URL lookups.

mod commands;
mod prompt;

use anyhow::Result;
use clap::Parser;
use clap_complete::Shell;
use pandb_core::config;
use pandb_core::settings::RunOverrides;
use std::path::PathBuf;

use commands::{print_completions, run_lookup};

/// Bulk PAN-DB URL lookup utility.
///
/// Run without any arguments to be prompted for the firewall, credentials
/// and input file; results then go to the configured default output file.
#[derive(Debug, Parser)]
#[command(name = "pandb-query")]
#[command(about = "Bulk PAN-DB URL lookup utility", long_about = None)]
pub struct Cli {
    /// Administrator username.
    #[arg(short, long, conflicts_with = "tag")]
    pub username: Option<String>,

    /// Administrator password.
    #[arg(short, long, conflicts_with = "tag")]
    pub password: Option<String>,

    /// Firewall hostname or IP address.
    #[arg(short, long, value_name = "HOST", conflicts_with = "tag")]
    pub firewall: Option<String>,

    /// Firewall tag from the .panrc file.
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Input file of URLs, one per line (default: stdin).
    #[arg(short, long, value_name = "PATH")]
    pub infile: Option<PathBuf>,

    /// Output CSV file (default: stdout).
    #[arg(short, long, value_name = "PATH")]
    pub outfile: Option<PathBuf>,

    /// File for URLs that could not be categorized (default from config: BadUrls.txt).
    #[arg(long, value_name = "PATH")]
    pub bad_urls: Option<PathBuf>,

    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL", value_enum)]
    pub completions: Option<Shell>,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        // No arguments at all selects the interactive prompt.
        let interactive = std::env::args_os().len() <= 1;
        let cli = Cli::parse();

        if let Some(shell) = cli.completions {
            print_completions(shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let overrides = if interactive {
            prompt::ask(&cfg)?
        } else {
            cli.into_overrides()
        };
        let run = overrides.resolve(&cfg)?;
        tracing::debug!("run config: {:?}", run);

        run_lookup(&run, &cfg)
    }

    fn into_overrides(self) -> RunOverrides {
        RunOverrides {
            username: self.username,
            password: self.password,
            firewall: self.firewall,
            tag: self.tag,
            infile: self.infile,
            outfile: self.outfile,
            bad_urls: self.bad_urls,
        }
    }
}

#[cfg(test)]
mod tests;
