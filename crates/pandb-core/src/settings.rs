//! Per-run settings: one immutable [`RunConfig`] resolved at startup.
//!
//! Callers fill a [`RunOverrides`] from exactly one source (command-line
//! flags, programmatic use, or the interactive prompt) and resolve it once
//! against the loaded [`PandbConfig`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::PandbConfig;

/// How to open the session.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Generate an API key on `host` with username/password.
    Password {
        host: String,
        username: String,
        password: String,
    },
    /// Named `.panrc` profile.
    Tag(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password { host, username, .. } => f
                .debug_struct("Password")
                .field("host", host)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Everything a batch run needs, fixed before the first request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub credentials: Credentials,
    pub input: InputSource,
    pub output: OutputTarget,
    pub bad_urls: PathBuf,
    pub progress_interval: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("--tag cannot be combined with {0}")]
    TagConflict(&'static str),
    #[error("missing credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
}

/// Optional values from one configuration source.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RunOverrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub firewall: Option<String>,
    pub tag: Option<String>,
    pub infile: Option<PathBuf>,
    pub outfile: Option<PathBuf>,
    pub bad_urls: Option<PathBuf>,
}

impl fmt::Debug for RunOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOverrides")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("firewall", &self.firewall)
            .field("tag", &self.tag)
            .field("infile", &self.infile)
            .field("outfile", &self.outfile)
            .field("bad_urls", &self.bad_urls)
            .finish()
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn non_empty_path(v: Option<PathBuf>) -> Option<PathBuf> {
    v.filter(|p| !p.as_os_str().is_empty())
}

impl RunOverrides {
    /// Resolve against the file config. Empty strings count as absent.
    pub fn resolve(self, cfg: &PandbConfig) -> Result<RunConfig, SettingsError> {
        let username = non_empty(self.username);
        let password = self.password.filter(|p| !p.is_empty());
        let firewall = non_empty(self.firewall);

        let credentials = match non_empty(self.tag) {
            Some(tag) => {
                let conflict = [
                    ("--username", username.is_some()),
                    ("--password", password.is_some()),
                    ("--firewall", firewall.is_some()),
                ]
                .into_iter()
                .find_map(|(flag, set)| set.then_some(flag));
                if let Some(flag) = conflict {
                    return Err(SettingsError::TagConflict(flag));
                }
                Credentials::Tag(tag.trim().to_string())
            }
            None => match (firewall, username, password) {
                (Some(host), Some(username), Some(password)) => Credentials::Password {
                    host: host.trim().to_string(),
                    username,
                    password,
                },
                (host, user, pass) => {
                    let missing = [
                        ("username", user.is_none()),
                        ("password", pass.is_none()),
                        ("firewall", host.is_none()),
                    ]
                    .into_iter()
                    .filter_map(|(name, absent)| absent.then_some(name))
                    .collect();
                    return Err(SettingsError::MissingCredentials(missing));
                }
            },
        };

        Ok(RunConfig {
            credentials,
            input: non_empty_path(self.infile).map_or(InputSource::Stdin, InputSource::File),
            output: non_empty_path(self.outfile).map_or(OutputTarget::Stdout, OutputTarget::File),
            bad_urls: non_empty_path(self.bad_urls).unwrap_or_else(|| cfg.bad_urls_path.clone()),
            progress_interval: cfg.progress_interval,
        })
    }
}
