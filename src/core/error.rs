use thiserror::Error;

/// Reasons a raw string is rejected as an asset URI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("the URI '{0}' is missing the '://' separator; expected '<scheme>://<path>'")]
    MissingSeparator(String),
    #[error(
        "the scheme '{0}' is invalid; schemes must be kebab-case: lowercase letters and single hyphens, \
         not starting or ending with a hyphen"
    )]
    InvalidSchemeFormat(String),
    #[error("the URI '{0}' has an empty path after '://'")]
    EmptyPath(String),
    #[error("the URI '{0}' is malformed; expected '<scheme>://<path>'")]
    MalformedUri(String),
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("invalid URI: {0}")]
    InvalidUri(#[from] ParseError),
    #[error("invalid scheme '{0}': must be kebab-case")]
    InvalidScheme(String),
    #[error("invalid namespace {0:?}: must not be empty or whitespace")]
    InvalidNamespace(String),
    #[error("asset lookup cancelled")]
    Cancelled,
    #[error("failed to release {} asset provider(s)", .0.len())]
    Release(Vec<AssetError>),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl AssetError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AssetError::Cancelled)
    }
}
