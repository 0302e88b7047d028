//! Single-URL category lookup: the client seam and the result type.
//!
//! The batch loop only depends on [`ClassificationClient`]; [`XapiClient`]
//! is the real implementation and tests plug in their own.

mod parse;

pub use parse::parse_response;

use thiserror::Error;

use crate::xapi::{XapiClient, XapiError};

/// Outcome of parsing one lookup response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Resolved { local: String, cloud: String },
    /// Response missing or not in the two-line layout.
    Unresolved,
}

/// A lookup that never produced a response to parse.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The device refused the query (malformed URL, policy error, ...).
    #[error("rejected by device: {0}")]
    Rejected(String),
    /// Transport or protocol failure for this request.
    #[error(transparent)]
    Transport(XapiError),
}

impl From<XapiError> for LookupError {
    fn from(e: XapiError) -> Self {
        match e {
            XapiError::Api { message, .. } => LookupError::Rejected(message),
            other => LookupError::Transport(other),
        }
    }
}

/// Something that can classify one URL at a time.
pub trait ClassificationClient {
    /// Raw response text for `url`; `Ok(None)` when the device answered without one.
    fn classify(&mut self, url: &str) -> Result<Option<String>, LookupError>;
}

impl ClassificationClient for XapiClient {
    fn classify(&mut self, url: &str) -> Result<Option<String>, LookupError> {
        Ok(self.test_url(url)?)
    }
}

/// One attempt: query then parse.
pub fn lookup_category<C>(client: &mut C, url: &str) -> Result<LookupResult, LookupError>
where
    C: ClassificationClient + ?Sized,
{
    let raw = client.classify(url)?;
    Ok(parse_response(raw.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<Option<&'static str>, &'static str>);

    impl ClassificationClient for Fixed {
        fn classify(&mut self, _url: &str) -> Result<Option<String>, LookupError> {
            match self.0 {
                Ok(raw) => Ok(raw.map(str::to_string)),
                Err(msg) => Err(LookupError::Rejected(msg.to_string())),
            }
        }
    }

    #[test]
    fn resolved_lookup() {
        let mut c = Fixed(Ok(Some("x news\ny shopping")));
        assert_eq!(
            lookup_category(&mut c, "a.com").unwrap(),
            LookupResult::Resolved {
                local: "news".into(),
                cloud: "shopping".into()
            }
        );
    }

    #[test]
    fn absent_response_is_unresolved() {
        let mut c = Fixed(Ok(None));
        assert_eq!(
            lookup_category(&mut c, "a.com").unwrap(),
            LookupResult::Unresolved
        );
    }

    #[test]
    fn rejection_propagates() {
        let mut c = Fixed(Err("url is invalid"));
        let err = lookup_category(&mut c, "bad url").unwrap_err();
        assert_eq!(err.to_string(), "rejected by device: url is invalid");
    }

    #[test]
    fn api_errors_become_rejections() {
        let e: LookupError = XapiError::Api {
            status: "error".into(),
            message: "nope".into(),
        }
        .into();
        assert!(matches!(e, LookupError::Rejected(m) if m == "nope"));
        let e: LookupError = XapiError::Http(502).into();
        assert!(matches!(e, LookupError::Transport(XapiError::Http(502))));
    }
}
