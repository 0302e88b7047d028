//! Open the one authenticated session a batch run uses.

use anyhow::{Context, Result};

use crate::config::PandbConfig;
use crate::panrc::{Panrc, ProfileAuth};
use crate::settings::Credentials;
use crate::xapi::XapiClient;

/// Authenticate with username/password (keygen) or a `.panrc` tag.
/// Any failure here is fatal to the run.
pub fn authenticate(credentials: &Credentials, cfg: &PandbConfig) -> Result<XapiClient> {
    let http = cfg.http();
    match credentials {
        Credentials::Password {
            host,
            username,
            password,
        } => {
            let client = XapiClient::keygen(host, username, password, &http)
                .with_context(|| format!("failed to authenticate to firewall {host}"))?;
            tracing::info!(user = %username, endpoint = %client.endpoint(), "session established");
            Ok(client)
        }
        Credentials::Tag(tag) => {
            let paths = cfg
                .panrc_paths
                .clone()
                .unwrap_or_else(Panrc::default_paths);
            let rc = Panrc::load(&paths)?;
            let profile = rc.profile(tag)?;
            let host = profile.host(tag)?;
            let client = match profile.auth(tag)? {
                ProfileAuth::ApiKey(key) => {
                    let mut client = XapiClient::with_api_key(&host, key, &http)?;
                    if let Err(e) = client.check_key() {
                        let what = if e.is_api_rejection() {
                            "API key rejected by"
                        } else {
                            "cannot reach"
                        };
                        return Err(anyhow::Error::new(e)
                            .context(format!("{what} firewall {host} (tag {tag})")));
                    }
                    client
                }
                ProfileAuth::Password { username, password } => {
                    XapiClient::keygen(&host, username, password, &http).with_context(|| {
                        format!("failed to authenticate to firewall {host} (tag {tag})")
                    })?
                }
            };
            tracing::info!(tag = %tag, endpoint = %client.endpoint(), "session established");
            Ok(client)
        }
    }
}
