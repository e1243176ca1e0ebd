//! This module provides an asset provider that serves files from a real directory on the host
//! system. All lookups are confined to the provider root.
//!
//! ### Key Features:
//! - **Isolated root**: Requests that normalize or resolve (through symlinks) to a path outside
//!   the root are never served.
//! - **Manifest**: A root may describe itself with an `asset.json` file naming its scheme.
//! - **Async reads**: `fetch_async()` reads through `tokio::fs` and honours cancellation.
//! - **Read-only**: The provider never creates, changes or removes anything on the host.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::core::uri::{Uri, is_valid_scheme};
use crate::core::{AssetError, AssetProvider, AssetStream, Result, utils};

/// Name of the optional manifest file at the provider root.
pub const MANIFEST_FILE: &str = "asset.json";

#[derive(Debug, Deserialize)]
struct Manifest {
    server_name: String,
}

/// An asset provider backed by a host directory.
///
/// `scheme://dir/file.txt` is served from `<root>/dir/file.txt`. The manifest file itself is
/// not an asset.
///
/// ### Example:
/// ```no_run
/// use asset_kit::{AssetProvider, DirProvider};
///
/// let tmp = std::env::temp_dir();
/// let provider = DirProvider::new(tmp.join("assets"), "assets").unwrap();
/// let logo = provider.fetch("assets://images/logo.svg").unwrap();
/// ```
#[derive(Debug)]
pub struct DirProvider {
    root: PathBuf, // host-related absolute canonical path
    scheme: String,
}

impl DirProvider {
    /// Creates a provider for the existing directory `root` answering to `scheme`.
    /// Errors if `root` is empty, is not an existing directory, or `scheme` is not kebab-case.
    pub fn new<P: AsRef<Path>>(root: P, scheme: &str) -> Result<Self> {
        let root = root.as_ref();

        if root.as_os_str().is_empty() {
            return Err(anyhow!("invalid root path: empty").into());
        }
        if !root.is_dir() {
            return Err(anyhow!("{:?} is not a directory", root).into());
        }
        if !is_valid_scheme(scheme) {
            return Err(AssetError::InvalidScheme(scheme.to_string()));
        }

        let root = root.canonicalize()?;
        debug!(root = %root.display(), scheme, "directory provider opened");
        Ok(Self {
            root,
            scheme: scheme.to_string(),
        })
    }

    /// Creates a provider for `root`, reading its scheme from the [`MANIFEST_FILE`] there.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let manifest_path = root.join(MANIFEST_FILE);
        let raw = std::fs::read(&manifest_path)
            .with_context(|| format!("cannot read manifest {}", manifest_path.display()))?;
        let manifest: Manifest = serde_json::from_slice(&raw)
            .with_context(|| format!("cannot parse manifest {}", manifest_path.display()))?;
        Self::new(root, &manifest.server_name)
    }

    /// Returns the root path related to the host file system.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Maps `uri` to an existing host path inside the root, with symlinks resolved.
    /// Returns `None` for a foreign scheme, an escaping path, a missing path, or the manifest.
    fn to_host(&self, uri: &str) -> Result<Option<PathBuf>> {
        let uri = Uri::parse(uri)?;
        if uri.scheme() != self.scheme {
            trace!(scheme = uri.scheme(), expected = %self.scheme, "foreign scheme");
            return Ok(None);
        }
        let inner = match utils::normalize(uri.path()) {
            Some(inner) if !inner.is_empty() => inner,
            _ => {
                trace!(path = uri.path(), "path outside of provider root");
                return Ok(None);
            }
        };
        // a path that cannot be resolved does not exist for us
        let Ok(host) = self.root.join(inner).canonicalize() else {
            return Ok(None);
        };
        if !host.starts_with(&self.root) {
            trace!(path = uri.path(), host = %host.display(), "link leads outside of provider root");
            return Ok(None);
        }
        if host == self.root || host == self.root.join(MANIFEST_FILE) {
            return Ok(None);
        }
        Ok(Some(host))
    }

    /// Returns the inner `/`-separated form of a host path below the root.
    fn to_inner(&self, host: &Path) -> Option<String> {
        let relative = host.strip_prefix(&self.root).ok()?;
        let segments: Vec<_> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect();
        Some(segments.join("/"))
    }
}

#[async_trait]
impl AssetProvider<Vec<u8>> for DirProvider {
    fn fetch(&self, uri: &str) -> Result<Option<Vec<u8>>> {
        match self.to_host(uri)? {
            Some(host) if host.is_file() => Ok(Some(std::fs::read(host)?)),
            _ => Ok(None),
        }
    }

    async fn fetch_async(&self, uri: &str, cancel: &CancellationToken) -> Result<Option<Vec<u8>>> {
        if cancel.is_cancelled() {
            return Err(AssetError::Cancelled);
        }
        let Some(host) = self.to_host(uri)? else {
            return Ok(None);
        };
        match tokio::fs::metadata(&host).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Ok(None),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AssetError::Cancelled),
            content = tokio::fs::read(&host) => Ok(Some(content?)),
        }
    }

    fn fetch_stream(&self, uri: &str) -> Result<Option<AssetStream>> {
        match self.to_host(uri)? {
            Some(host) if host.is_file() => Ok(Some(Box::new(File::open(host)?))),
            _ => Ok(None),
        }
    }

    /// Lists every file below the root in file-name order, except the manifest and noise files.
    fn available_assets(&self) -> Result<Vec<String>> {
        let mut assets = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(inner) = self.to_inner(entry.path()) else {
                continue;
            };
            if inner == MANIFEST_FILE {
                continue;
            }
            assets.push(format!("{}://{}", self.scheme, inner));
        }
        Ok(utils::exclude_system_names(assets).collect())
    }
}
