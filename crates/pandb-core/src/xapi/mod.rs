//! PAN-OS XML API client.
//!
//! Uses the curl crate (libcurl) with one reused `Easy` handle per session.
//! Requests are form-encoded POSTs to `https://<host>/api/` so the password
//! and API key never end up in a request line or proxy log.

mod error;
mod response;

pub use error::XapiError;
pub use response::{ApiResponse, Element};

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::config::HttpConfig;

/// Authenticated session against one firewall.
pub struct XapiClient {
    endpoint: String,
    api_key: String,
    easy: curl::easy::Easy,
}

impl fmt::Debug for XapiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XapiClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl XapiClient {
    /// Generate an API key from username/password (`type=keygen`) and return a session using it.
    pub fn keygen(
        host: &str,
        username: &str,
        password: &str,
        http: &HttpConfig,
    ) -> Result<Self, XapiError> {
        let endpoint = endpoint_for(host)?;
        let mut easy = new_handle(http)?;
        let resp = post(
            &mut easy,
            &endpoint,
            &[("type", "keygen"), ("user", username), ("password", password)],
        )?;
        let key = resp
            .result()
            .and_then(|r| r.child("key"))
            .map(|k| k.text.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(XapiError::MissingElement("key"))?;
        tracing::debug!(endpoint = %endpoint, "API key generated");
        Ok(Self {
            endpoint,
            api_key: key,
            easy,
        })
    }

    /// Session from a pre-shared API key (e.g. from a `.panrc` profile). No request is made.
    pub fn with_api_key(host: &str, api_key: &str, http: &HttpConfig) -> Result<Self, XapiError> {
        Ok(Self {
            endpoint: endpoint_for(host)?,
            api_key: api_key.to_string(),
            easy: new_handle(http)?,
        })
    }

    /// Confirm the key is accepted with a cheap `show system info`.
    pub fn check_key(&mut self) -> Result<(), XapiError> {
        self.op(SHOW_SYSTEM_INFO)?;
        Ok(())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run an operational command (`type=op`). Returns the response only for `status="success"`.
    pub fn op(&mut self, cmd: &str) -> Result<ApiResponse, XapiError> {
        post(
            &mut self.easy,
            &self.endpoint,
            &[("type", "op"), ("cmd", cmd), ("key", self.api_key.as_str())],
        )
    }

    /// `test url <url>`: raw text of `<result>`, or None when the result is empty or missing.
    pub fn test_url(&mut self, url: &str) -> Result<Option<String>, XapiError> {
        let resp = self.op(&test_url_command(url))?;
        Ok(resp
            .result()
            .and_then(Element::text_opt)
            .map(str::to_string))
    }
}

pub const SHOW_SYSTEM_INFO: &str = "<show><system><info></info></system></show>";

/// `<test><url>…</url></test>` with the URL XML-escaped.
pub fn test_url_command(url: &str) -> String {
    format!(
        "<test><url>{}</url></test>",
        quick_xml::escape::escape(url)
    )
}

/// Turn a firewall host (`fw.example.com`, `10.0.0.1:4443`, or a full `http(s)://` URL)
/// into the API endpoint URL.
pub fn endpoint_for(host: &str) -> Result<String, XapiError> {
    let host = host.trim();
    let invalid = |reason: String| XapiError::InvalidHost {
        host: host.to_string(),
        reason,
    };
    if host.is_empty() {
        return Err(invalid("empty".to_string()));
    }
    let base = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    let mut url = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("no host name".to_string()));
    }
    url.set_path("/api/");
    url.set_query(None);
    Ok(url.to_string())
}

fn new_handle(http: &HttpConfig) -> Result<curl::easy::Easy, XapiError> {
    let mut easy = curl::easy::Easy::new();
    easy.useragent(concat!("pandb-query/", env!("CARGO_PKG_VERSION")))?;
    easy.connect_timeout(http.connect_timeout())?;
    easy.timeout(http.timeout())?;
    easy.follow_location(false)?;
    easy.ssl_verify_peer(http.verify_tls)?;
    easy.ssl_verify_host(http.verify_tls)?;
    if !http.verify_tls {
        tracing::warn!("TLS certificate verification disabled for firewall API");
    }
    // Keep the session's connection warm between lookups.
    easy.tcp_keepalive(true)?;
    easy.tcp_keepidle(Duration::from_secs(30))?;
    Ok(easy)
}

/// Form-encoded POST; returns the parsed response if `status="success"`.
fn post(
    easy: &mut curl::easy::Easy,
    endpoint: &str,
    fields: &[(&str, &str)],
) -> Result<ApiResponse, XapiError> {
    let body = fields
        .iter()
        .map(|(k, v)| {
            let v = easy.url_encode(v.as_bytes());
            format!("{k}={v}")
        })
        .collect::<Vec<_>>()
        .join("&");

    let mut buf: Vec<u8> = Vec::new();
    easy.url(endpoint)?;
    easy.post(true)?;
    easy.post_fields_copy(body.as_bytes())?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            buf.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    let text = String::from_utf8_lossy(&buf);
    if !(200..300).contains(&code) {
        // PAN-OS answers auth failures with 403 plus an XML error body.
        return match ApiResponse::parse(&text) {
            Ok(resp) if resp.message().is_some() => resp.into_success(),
            _ => Err(XapiError::Http(code)),
        };
    }
    ApiResponse::parse(&text)?.into_success()
}
