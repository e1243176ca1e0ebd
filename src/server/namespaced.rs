//! A path-prefix view over another provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::uri::Uri;
use crate::core::{AssetError, AssetProvider, AssetStream, Result};

/// Exposes the `<namespace>/...` sub-tree of an inner provider as if it were the root.
///
/// `scheme://path` is looked up as `scheme://<namespace>/path`, and `available_assets()` only
/// reports inner assets below `<namespace>/`, with that prefix removed. The rewrite happens
/// before the inner provider sees the request, so an inner [`AssetServer`] still applies its own
/// extension expansion.
///
/// The view holds no assets of its own. It does not release the inner provider on `close()`
/// unless it was created with [`NamespacedServer::owning`].
///
/// [`AssetServer`]: crate::AssetServer
pub struct NamespacedServer<T: Send + 'static> {
    inner: Arc<dyn AssetProvider<T>>,
    namespace: String,
    owns_inner: bool,
    closed: AtomicBool,
}

impl<T: Send + 'static> NamespacedServer<T> {
    /// Creates a view of `inner` scoped to `namespace`. The inner provider stays shared:
    /// closing the view leaves it open.
    ///
    /// Surrounding `/` and whitespace are trimmed from `namespace`, nested namespaces like
    /// `"ui/icons"` are allowed. Returns [`AssetError::InvalidNamespace`] if nothing remains.
    pub fn new(inner: Arc<dyn AssetProvider<T>>, namespace: &str) -> Result<Self> {
        Self::build(inner, namespace, false)
    }

    /// Like [`new`](Self::new), but `close()` also releases the inner provider.
    pub fn owning(inner: Arc<dyn AssetProvider<T>>, namespace: &str) -> Result<Self> {
        Self::build(inner, namespace, true)
    }

    fn build(inner: Arc<dyn AssetProvider<T>>, namespace: &str, owns_inner: bool) -> Result<Self> {
        let trimmed = namespace.trim_matches(|c: char| c == '/' || c.is_whitespace());
        if trimmed.is_empty() {
            return Err(AssetError::InvalidNamespace(namespace.to_string()));
        }
        Ok(Self {
            inner,
            namespace: trimmed.to_string(),
            owns_inner,
            closed: AtomicBool::new(false),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn inner(&self) -> &Arc<dyn AssetProvider<T>> {
        &self.inner
    }

    /// Rewrites `scheme://path` into `scheme://<namespace>/path`.
    pub fn scoped_uri(&self, uri: &str) -> Result<String> {
        let uri = Uri::parse(uri)?;
        let scoped = uri.with_path(format!("{}/{}", self.namespace, uri.path()));
        Ok(scoped.to_string())
    }
}

#[async_trait]
impl<T: Send + 'static> AssetProvider<T> for NamespacedServer<T> {
    fn fetch(&self, uri: &str) -> Result<Option<T>> {
        self.inner.fetch(&self.scoped_uri(uri)?)
    }

    async fn fetch_async(&self, uri: &str, cancel: &CancellationToken) -> Result<Option<T>> {
        let scoped = self.scoped_uri(uri)?;
        self.inner.fetch_async(&scoped, cancel).await
    }

    fn fetch_stream(&self, uri: &str) -> Result<Option<AssetStream>> {
        self.inner.fetch_stream(&self.scoped_uri(uri)?)
    }

    /// Lists inner assets below `<namespace>/` with the prefix stripped.
    /// The bare `<namespace>/` entry itself has no local name and is skipped.
    fn available_assets(&self) -> Result<Vec<String>> {
        let prefix = format!("{}/", self.namespace);
        let mut assets = Vec::new();
        for asset in self.inner.available_assets()? {
            let uri = Uri::parse(&asset)?;
            if let Some(local) = uri.path().strip_prefix(&prefix) {
                if local.trim().is_empty() {
                    continue;
                }
                assets.push(uri.with_path(local).to_string());
            }
        }
        Ok(assets)
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) || !self.owns_inner {
            return Ok(());
        }
        debug!(namespace = %self.namespace, "releasing namespaced provider");
        self.inner.close()
    }
}
