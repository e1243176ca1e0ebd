//! Asset URIs of the form `<scheme>://<path>`.
//!
//! The scheme names the logical server (kebab-case), the path is any non-blank remainder.
//! No escaping, query or fragment syntax is defined.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ParseError;

pub const SEPARATOR: &str = "://";

static URI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<scheme>[a-z]+(-[a-z]+)*)://(?P<path>.+)$").expect("valid URI regex")
});

static SCHEME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+(-[a-z]+)*$").expect("valid scheme regex"));

/// Returns `true` if `scheme` is a valid kebab-case scheme (server) name.
pub fn is_valid_scheme(scheme: &str) -> bool {
    !scheme.is_empty() && SCHEME_REGEX.is_match(scheme)
}

/// A validated `(scheme, path)` pair.
///
/// A `Uri` can only be obtained by parsing, so its invariants always hold:
/// * `scheme` matches `^[a-z]+(-[a-z]+)*$`;
/// * `path` is non-empty and not all whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri {
    scheme: String,
    path: String,
}

impl Uri {
    /// Parses and validates `raw`.
    ///
    /// # Errors
    /// * [`ParseError::MissingSeparator`] - `raw` contains no `://`.
    /// * [`ParseError::InvalidSchemeFormat`] - the scheme is empty or not kebab-case.
    /// * [`ParseError::EmptyPath`] - nothing but whitespace after `://`.
    /// * [`ParseError::MalformedUri`] - any other mismatch, e.g. several `://` with a bad split.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if let Some(caps) = URI_REGEX.captures(raw) {
            let path = &caps["path"];
            if path.trim().is_empty() {
                return Err(ParseError::EmptyPath(raw.to_string()));
            }
            return Ok(Self {
                scheme: caps["scheme"].to_string(),
                path: path.to_string(),
            });
        }

        if !raw.contains(SEPARATOR) {
            return Err(ParseError::MissingSeparator(raw.to_string()));
        }

        let parts: Vec<&str> = raw.split(SEPARATOR).collect();
        if parts.len() != 2 {
            return Err(ParseError::MalformedUri(raw.to_string()));
        }
        // a bad scheme is reported even when the path is blank too, e.g. `Bad://`
        if !is_valid_scheme(parts[0]) {
            return Err(ParseError::InvalidSchemeFormat(parts[0].to_string()));
        }
        if parts[1].trim().is_empty() {
            return Err(ParseError::EmptyPath(raw.to_string()));
        }

        // valid scheme, non-blank path, yet no match (e.g. a line break inside the path)
        Err(ParseError::MalformedUri(raw.to_string()))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns a copy of this URI pointing at `path` under the same scheme.
    /// `path` must satisfy the path invariant; callers only derive it from a valid path.
    pub(crate) fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            scheme: self.scheme.clone(),
            path: path.into(),
        }
    }

    pub fn into_parts(self) -> (String, String) {
        (self.scheme, self.path)
    }
}

impl FromStr for Uri {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Uri::parse(value)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scheme, SEPARATOR, self.path)
    }
}
