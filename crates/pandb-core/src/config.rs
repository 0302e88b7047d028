use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// HTTP transport parameters for the firewall XML API (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Seconds allowed for the TCP/TLS handshake.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a whole request (keygen or a single lookup).
    pub timeout_secs: u64,
    /// Verify the firewall's TLS certificate. Management interfaces often carry
    /// self-signed certificates; set to false for those.
    pub verify_tls: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 30,
            verify_tls: true,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/pandb/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PandbConfig {
    /// Result file used when running interactively (no flags given).
    pub default_outfile: PathBuf,
    /// Where URLs that could not be categorized are written.
    pub bad_urls_path: PathBuf,
    /// Print `count/total` every N processed URLs (0 = never).
    pub progress_interval: usize,
    /// Optional HTTP settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
    /// Optional explicit list of `.panrc` files; if missing, the standard
    /// locations are searched.
    #[serde(default)]
    pub panrc_paths: Option<Vec<PathBuf>>,
}

impl Default for PandbConfig {
    fn default() -> Self {
        Self {
            default_outfile: PathBuf::from("results.csv"),
            bad_urls_path: PathBuf::from("BadUrls.txt"),
            progress_interval: 10,
            http: None,
            panrc_paths: None,
        }
    }
}

impl PandbConfig {
    /// Effective HTTP settings (configured section or defaults).
    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pandb")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PandbConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<PandbConfig> {
    if !path.exists() {
        let default_cfg = PandbConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: PandbConfig = toml::from_str(&data)?;
    Ok(cfg)
}
