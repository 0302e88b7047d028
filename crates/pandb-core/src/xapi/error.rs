//! Error type for firewall XML API calls.

use thiserror::Error;

/// Failure of a single XML API request (keygen or op).
#[derive(Debug, Error)]
pub enum XapiError {
    /// Host string could not be turned into an `https://<host>/api/` endpoint.
    #[error("invalid firewall host {host:?}: {reason}")]
    InvalidHost { host: String, reason: String },
    /// libcurl reported an error (connect, TLS, timeout, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Non-2xx status without a parsable API error message.
    #[error("HTTP {0}")]
    Http(u32),
    /// Body was not well-formed XML.
    #[error("malformed XML response: {0}")]
    Xml(#[from] quick_xml::Error),
    /// The device answered with `status="error"` (or a non-success status).
    #[error("{message}")]
    Api { status: String, message: String },
    /// Response was well-formed but lacked an element the request needs.
    #[error("response missing <{0}>")]
    MissingElement(&'static str),
}

impl XapiError {
    /// True when the device itself rejected the request (as opposed to a transport failure).
    pub fn is_api_rejection(&self) -> bool {
        matches!(self, XapiError::Api { .. })
    }
}
