//! Message origin parsing and allow-list matching
//!
//! The origin of a cross-window message is the trust boundary of the
//! handshake. Matching is an exact, case-sensitive string comparison
//! against the configured list: no wildcarding, no scheme or port
//! coercion. `https://a.test` does not match `https://a.test:8080`, and
//! it does not match `http://a.test`.

use sb_types::{AppError, AppResult};
use std::fmt;
use url::Url;

/// A validated origin string (scheme + host + optional port)
///
/// The configured string is kept verbatim for comparison; parsing only
/// rejects strings that are not plain origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin(String);

impl Origin {
    /// Validate `raw` as an exact origin string.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::Config("allowed origin must not be empty".to_string()));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| AppError::Config(format!("invalid origin {:?}: {}", trimmed, e)))?;

        if !url.has_host() {
            return Err(AppError::Config(format!("origin {:?} has no host", trimmed)));
        }
        if !matches!(url.path(), "" | "/") || trimmed.ends_with('/') {
            return Err(AppError::Config(format!(
                "origin {:?} must not carry a path",
                trimmed
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(AppError::Config(format!(
                "origin {:?} must not carry a query or fragment",
                trimmed
            )));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(AppError::Config(format!(
                "origin {:?} must not carry credentials",
                trimmed
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The origin exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, non-empty list of origins allowed to post the callback message
#[derive(Debug, Clone)]
pub struct OriginAllowList(Vec<Origin>);

impl OriginAllowList {
    /// Build an allow-list from raw origin strings.
    ///
    /// The list must be non-empty and every entry must be a plain origin.
    pub fn new<I, S>(raw: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins = raw
            .into_iter()
            .map(|s| Origin::parse(s.as_ref()))
            .collect::<AppResult<Vec<_>>>()?;

        if origins.is_empty() {
            return Err(AppError::Config(
                "allowed_origins must not be empty".to_string(),
            ));
        }

        Ok(Self(origins))
    }

    /// Exact membership test against a message origin.
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed.as_str() == origin)
    }

    /// Number of configured origins.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
