//! Interactive fallback used when the program is started with no arguments.

use anyhow::Result;
use dialoguer::{Input, Password};
use pandb_core::config::PandbConfig;
use pandb_core::settings::RunOverrides;
use std::path::PathBuf;

/// Ask for firewall, username, password (hidden) and input file.
pub fn ask(cfg: &PandbConfig) -> Result<RunOverrides> {
    let firewall: String = Input::new()
        .with_prompt("Enter the IP of the firewall")
        .interact_text()?;
    let username: String = Input::new()
        .with_prompt("Enter the username")
        .interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;
    let infile: String = Input::new()
        .with_prompt("Enter the text file with URLs")
        .interact_text()?;

    Ok(interactive_overrides(cfg, firewall, username, password, &infile))
}

/// Results of an interactive run always go to the configured default result file.
fn interactive_overrides(
    cfg: &PandbConfig,
    firewall: String,
    username: String,
    password: String,
    infile: &str,
) -> RunOverrides {
    RunOverrides {
        username: Some(username),
        password: Some(password),
        firewall: Some(firewall),
        infile: Some(PathBuf::from(infile.trim())),
        outfile: Some(cfg.default_outfile.clone()),
        ..RunOverrides::default()
    }
}
