//! Syntactic validators for user-supplied strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid url")]
    InvalidUrl,

    #[error("Invalid e-mail address")]
    InvalidMail,
}

/// Accepts absolute URLs with a scheme, e.g. `http://example.com`.
pub fn validate_url(raw: &str) -> Result<(), ValidationError> {
    match Url::parse(raw) {
        Ok(url) if !url.scheme().is_empty() && !url.cannot_be_a_base() => Ok(()),
        _ => Err(ValidationError::InvalidUrl),
    }
}

/// Accepts `local@domain.tld` shaped addresses.
pub fn validate_email(raw: &str) -> Result<(), ValidationError> {
    let (local, domain) = raw.rsplit_once('@').ok_or(ValidationError::InvalidMail)?;

    let local_ok = !local.is_empty()
        && local.len() <= 64
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~.".contains(c));

    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });

    if local_ok && domain_ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidMail)
    }
}

/// A URL string that can be checked before use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RequestUrl(pub String);

impl RequestUrl {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_url(&self.0)
    }
}

impl fmt::Display for RequestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An e-mail address string that can be checked before use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Email(pub String);

impl Email {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        for invalid in ["example", "example.com", "www.example.com", "", "mailto:a@b.c"] {
            assert_eq!(
                RequestUrl(invalid.into()).validate(),
                Err(ValidationError::InvalidUrl),
                "{invalid}"
            );
        }
        assert!(RequestUrl("http://example.com".into()).validate().is_ok());
        assert!(validate_url("https://api.example.com:8443/v1?x=1").is_ok());
    }

    #[test]
    fn test_email() {
        for invalid in [
            "example",
            "example.com",
            "www.example.com",
            "@example.com",
            "test@",
            "test@localhost",
            "te..st@example.com",
            "test@exa_mple.com",
        ] {
            assert_eq!(
                Email(invalid.into()).validate(),
                Err(ValidationError::InvalidMail),
                "{invalid}"
            );
        }
        assert!(Email("test@example.com".into()).validate().is_ok());
        assert!(Email("test+test1@example.com".into()).validate().is_ok());
    }
}
