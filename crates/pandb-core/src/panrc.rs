//! `.panrc` profiles: named firewall connections selected with `--tag`.
//!
//! Each line is `key%tag=value`; `#` starts a comment. Files are read in
//! order and later files override earlier ones key by key.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanrcError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("tag {0:?} not found in any .panrc file")]
    UnknownTag(String),
    #[error("tag {0:?} has no hostname")]
    MissingHostname(String),
    #[error("tag {0:?} has neither api_key nor api_username/api_password")]
    MissingAuth(String),
}

/// Connection details for one tag.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PanrcProfile {
    pub hostname: Option<String>,
    pub port: Option<String>,
    pub api_key: Option<String>,
    pub api_username: Option<String>,
    pub api_password: Option<String>,
}

impl fmt::Debug for PanrcProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanrcProfile")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_username", &self.api_username)
            .field("api_password", &self.api_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// How a profile authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileAuth<'a> {
    ApiKey(&'a str),
    Password { username: &'a str, password: &'a str },
}

impl PanrcProfile {
    /// `hostname[:port]`, failing when no hostname is set.
    pub fn host(&self, tag: &str) -> Result<String, PanrcError> {
        let hostname = self
            .hostname
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| PanrcError::MissingHostname(tag.to_string()))?;
        Ok(match self.port.as_deref() {
            Some(port) if !port.is_empty() => format!("{hostname}:{port}"),
            _ => hostname.to_string(),
        })
    }

    /// API key wins over username/password when both are present.
    pub fn auth(&self, tag: &str) -> Result<ProfileAuth<'_>, PanrcError> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(ProfileAuth::ApiKey(key));
        }
        match (self.api_username.as_deref(), self.api_password.as_deref()) {
            (Some(username), Some(password)) => Ok(ProfileAuth::Password { username, password }),
            _ => Err(PanrcError::MissingAuth(tag.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "hostname" => &mut self.hostname,
            "port" => &mut self.port,
            "api_key" => &mut self.api_key,
            "api_username" => &mut self.api_username,
            "api_password" => &mut self.api_password,
            _ => return false,
        };
        *slot = Some(value.to_string());
        true
    }
}

/// All tagged profiles found across the searched files.
#[derive(Debug, Default)]
pub struct Panrc {
    profiles: HashMap<String, PanrcProfile>,
}

impl Panrc {
    /// Standard search order: `/etc/panrc`, `~/.panrc`, `./.panrc`.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/panrc")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".panrc"));
        }
        paths.push(PathBuf::from(".panrc"));
        paths
    }

    /// Read every existing file in `paths`; missing files are skipped.
    pub fn load(paths: &[PathBuf]) -> Result<Self, PanrcError> {
        let mut rc = Panrc::default();
        for path in paths {
            match fs::read_to_string(path) {
                Ok(text) => {
                    tracing::debug!("reading {}", path.display());
                    rc.merge_str(&text, path);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(PanrcError::Io {
                        path: path.clone(),
                        source,
                    })
                }
            }
        }
        Ok(rc)
    }

    /// Merge the contents of one file; `origin` is only used for log messages.
    pub fn merge_str(&mut self, text: &str, origin: &Path) {
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((lhs, value)) = line.split_once('=') else {
                tracing::warn!("{}:{}: ignoring line without '='", origin.display(), lineno + 1);
                continue;
            };
            let Some((key, tag)) = lhs.trim().split_once('%') else {
                // Untagged defaults are not used; every lookup goes through a tag.
                continue;
            };
            let (key, tag) = (key.trim(), tag.trim());
            if tag.is_empty() {
                continue;
            }
            let known = self
                .profiles
                .entry(tag.to_string())
                .or_default()
                .set(key, value.trim());
            if !known {
                tracing::debug!("{}:{}: ignoring key {key:?}", origin.display(), lineno + 1);
            }
        }
    }

    pub fn profile(&self, tag: &str) -> Result<&PanrcProfile, PanrcError> {
        self.profiles
            .get(tag)
            .ok_or_else(|| PanrcError::UnknownTag(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rc(text: &str) -> Panrc {
        let mut rc = Panrc::default();
        rc.merge_str(text, Path::new("test"));
        rc
    }

    #[test]
    fn parses_tagged_profile_with_key() {
        let rc = rc("# lab firewalls\n\
                     hostname%lab=10.0.0.1\n\
                     api_key%lab=LUFRPT1==\n\
                     hostname%prod=fw.example.com\n");
        let lab = rc.profile("lab").unwrap();
        assert_eq!(lab.host("lab").unwrap(), "10.0.0.1");
        assert_eq!(lab.auth("lab").unwrap(), ProfileAuth::ApiKey("LUFRPT1=="));
        assert!(rc.profile("prod").is_ok());
    }

    #[test]
    fn value_may_contain_equals_and_port_is_appended() {
        let rc = rc("hostname%a = fw\nport%a=4443\napi_username%a=admin\napi_password%a=p=w\n");
        let a = rc.profile("a").unwrap();
        assert_eq!(a.host("a").unwrap(), "fw:4443");
        assert_eq!(
            a.auth("a").unwrap(),
            ProfileAuth::Password {
                username: "admin",
                password: "p=w"
            }
        );
    }

    #[test]
    fn untagged_and_malformed_lines_ignored() {
        let rc = rc("hostname=10.0.0.9\ngarbage\napi_key%=x\n");
        assert!(matches!(rc.profile("x"), Err(PanrcError::UnknownTag(_))));
    }

    #[test]
    fn missing_fields_are_errors() {
        let rc = rc("api_key%k=abc\nhostname%h=fw\n");
        assert!(matches!(
            rc.profile("k").unwrap().host("k"),
            Err(PanrcError::MissingHostname(_))
        ));
        assert!(matches!(
            rc.profile("h").unwrap().auth("h"),
            Err(PanrcError::MissingAuth(_))
        ));
    }

    #[test]
    fn later_files_override_earlier() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("panrc");
        let second = dir.path().join(".panrc");
        fs::write(&first, "hostname%fw=old\napi_key%fw=K1\n").unwrap();
        fs::write(&second, "hostname%fw=new\n").unwrap();
        let missing = dir.path().join("absent");

        let rc = Panrc::load(&[first, missing, second]).unwrap();
        let fw = rc.profile("fw").unwrap();
        assert_eq!(fw.hostname.as_deref(), Some("new"));
        assert_eq!(fw.api_key.as_deref(), Some("K1"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let rc = rc("hostname%t=fw\napi_key%t=TOPSECRET\napi_password%t=hunter2\n");
        let dbg = format!("{:?}", rc.profile("t").unwrap());
        assert!(!dbg.contains("TOPSECRET"));
        assert!(!dbg.contains("hunter2"));
    }
}
