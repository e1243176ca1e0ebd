//! This module provides the composite asset server: an ordered, mutable collection of providers
//! queried one after another until the first one has the requested asset.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::core::uri::Uri;
use crate::core::{AssetError, AssetProvider, AssetStream, Result, utils};

/// An ordered-fallback aggregator over several [`AssetProvider`]s.
///
/// ### Resolution order
///
/// A request `scheme://name` is expanded into candidate names: the bare `name` first, then
/// `name.<ext>` for every search extension in the order the extensions were added. Candidates
/// are the outer loop, providers the inner one: every provider is asked for `name` before any
/// provider is asked for `name.<ext>`. Providers are asked in registration order and the first
/// `Some` wins.
///
/// ### Thread Safety
///
/// The provider list is guarded by a single mutex which is held only long enough to copy the
/// list. Provider calls always run on that snapshot outside the lock, so a slow provider never
/// blocks `add_provider()`/`remove_provider()`, and a lookup never observes a half-changed list.
///
/// ### Failures
///
/// Provider errors are not masked as "not found": they abort the search and are returned as is.
///
/// ### Example
///
/// ```no_run
/// use std::sync::Arc;
/// use asset_kit::{AssetProvider, AssetServer, MapProvider};
///
/// let textures: MapProvider = MapProvider::new("assets").unwrap();
/// textures.insert("grass.png", b"...".to_vec()).unwrap();
///
/// let server = AssetServer::<Vec<u8>>::single(Arc::new(textures)).with_extension("png");
/// assert!(server.fetch("assets://grass").unwrap().is_some());
/// ```
pub struct AssetServer<T: Send + 'static> {
    providers: Mutex<Vec<Arc<dyn AssetProvider<T>>>>,
    extensions: RwLock<Vec<String>>,
    ignored: RwLock<Vec<String>>,
    closed: AtomicBool,
}

impl<T: Send + 'static> AssetServer<T> {
    /// Creates an empty server with the default noise-name ignore list.
    pub fn new() -> Self {
        Self {
            providers: Mutex::new(Vec::new()),
            extensions: RwLock::new(Vec::new()),
            ignored: RwLock::new(
                utils::SYSTEM_NAME_IGNORE_LIST
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
            ),
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a server with a single provider.
    pub fn single(provider: Arc<dyn AssetProvider<T>>) -> Self {
        Self::new().with_provider(provider)
    }

    /// Creates a server pre-seeded with `providers`, keeping their order.
    pub fn with_providers<I>(providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn AssetProvider<T>>>,
    {
        let server = Self::new();
        for provider in providers {
            server.add_provider(provider);
        }
        server
    }

    pub fn with_provider(self, provider: Arc<dyn AssetProvider<T>>) -> Self {
        self.add_provider(provider);
        self
    }

    pub fn with_extension(self, extension: &str) -> Self {
        self.add_extension(extension);
        self
    }

    /// Replaces the noise-name ignore list used by `available_assets()`.
    pub fn with_ignored_names<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.ignored.write() = names.into_iter().map(Into::into).collect();
        self
    }

    /// Appends `provider` to the end of the resolution order.
    /// The same provider may be registered several times.
    pub fn add_provider(&self, provider: Arc<dyn AssetProvider<T>>) {
        let mut providers = self.providers.lock();
        providers.push(provider);
        debug!(count = providers.len(), "asset provider added");
    }

    /// Removes the first registration of `provider`.
    /// Returns `false` if it was not registered.
    pub fn remove_provider<P>(&self, provider: &Arc<P>) -> bool
    where
        P: AssetProvider<T> + ?Sized,
    {
        let target = Arc::as_ptr(provider).cast::<()>();
        let mut providers = self.providers.lock();
        match providers
            .iter()
            .position(|registered| Arc::as_ptr(registered).cast::<()>() == target)
        {
            Some(index) => {
                providers.remove(index);
                debug!(count = providers.len(), "asset provider removed");
                true
            }
            None => false,
        }
    }

    /// Returns a point-in-time copy of the registered providers.
    pub fn providers(&self) -> Vec<Arc<dyn AssetProvider<T>>> {
        self.providers.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.providers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.lock().is_empty()
    }

    /// Adds a search extension. Leading and trailing dots are trimmed, so `".json"`, `"json"`
    /// and `"json."` are the same extension.
    /// Returns `false` if the extension is empty or already present.
    pub fn add_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_matches('.');
        if extension.is_empty() {
            debug!("empty search extension ignored");
            return false;
        }
        let mut extensions = self.extensions.write();
        if extensions.iter().any(|known| known == extension) {
            return false;
        }
        extensions.push(extension.to_string());
        true
    }

    pub fn extensions(&self) -> Vec<String> {
        self.extensions.read().clone()
    }

    /// Adds `name` to the noise-name ignore list (matched case-insensitively as a substring).
    pub fn ignore_name(&self, name: &str) {
        let mut ignored = self.ignored.write();
        if !ignored.iter().any(|known| known == name) {
            ignored.push(name.to_string());
        }
    }

    /// Expands `path` into candidate names: `path` itself, then `path.<ext>` for every search
    /// extension, in insertion order.
    pub fn candidates(&self, path: &str) -> Vec<String> {
        let extensions = self.extensions.read();
        let mut candidates = Vec::with_capacity(extensions.len() + 1);
        candidates.push(path.to_string());
        candidates.extend(extensions.iter().map(|ext| format!("{path}.{ext}")));
        candidates
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Parses `uri` and returns the candidate URIs together with a snapshot of the providers.
    fn plan(&self, uri: &str) -> Result<(Vec<String>, Vec<Arc<dyn AssetProvider<T>>>)> {
        let uri = Uri::parse(uri)?;
        let candidates = self
            .candidates(uri.path())
            .into_iter()
            .map(|path| uri.with_path(path).to_string())
            .collect();
        Ok((candidates, self.providers()))
    }

    /// Runs `probe` over candidates (outer) and providers (inner) until it yields a value.
    fn first_match<R, F>(&self, uri: &str, mut probe: F) -> Result<Option<R>>
    where
        F: FnMut(&dyn AssetProvider<T>, &str) -> Result<Option<R>>,
    {
        let (candidates, providers) = self.plan(uri)?;
        for candidate in &candidates {
            for provider in &providers {
                trace!(uri = %candidate, "probing asset provider");
                if let Some(found) = probe(provider.as_ref(), candidate)? {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }
}

impl<T: Send + 'static> Default for AssetServer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> From<Vec<Arc<dyn AssetProvider<T>>>> for AssetServer<T> {
    fn from(providers: Vec<Arc<dyn AssetProvider<T>>>) -> Self {
        Self::with_providers(providers)
    }
}

#[async_trait]
impl<T: Send + 'static> AssetProvider<T> for AssetServer<T> {
    /// Returns the first asset found, or `None` once every candidate was tried on every provider.
    fn fetch(&self, uri: &str) -> Result<Option<T>> {
        self.first_match(uri, |provider, candidate| provider.fetch(candidate))
    }

    /// Same search order as `fetch()`. Cancellation is checked before every provider call and
    /// raced against the call itself; it is reported as [`AssetError::Cancelled`].
    async fn fetch_async(&self, uri: &str, cancel: &CancellationToken) -> Result<Option<T>> {
        let (candidates, providers) = self.plan(uri)?;
        for candidate in &candidates {
            for provider in &providers {
                if cancel.is_cancelled() {
                    return Err(AssetError::Cancelled);
                }
                trace!(uri = %candidate, "probing asset provider");
                let found = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(AssetError::Cancelled),
                    found = provider.fetch_async(candidate, cancel) => found?,
                };
                if found.is_some() {
                    return Ok(found);
                }
            }
        }
        Ok(None)
    }

    fn fetch_stream(&self, uri: &str) -> Result<Option<AssetStream>> {
        self.first_match(uri, |provider, candidate| provider.fetch_stream(candidate))
    }

    /// Concatenates the assets of every provider in registration order, without noise names.
    /// Duplicates advertised by different providers are kept.
    fn available_assets(&self) -> Result<Vec<String>> {
        let providers = self.providers();
        let mut assets = Vec::new();
        for provider in &providers {
            assets.extend(provider.available_assets()?);
        }
        let ignored = self.ignored.read().clone();
        Ok(utils::exclude_names(assets, &ignored).collect())
    }

    /// Releases every registered provider exactly once, even if some of them fail.
    /// A provider registered several times is released once. Subsequent calls do nothing.
    /// Failures are collected into [`AssetError::Release`].
    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut providers = std::mem::take(&mut *self.providers.lock());
        let mut released = HashSet::new();
        providers.retain(|provider| released.insert(Arc::as_ptr(provider).cast::<()>()));
        let mut failures = Vec::new();
        for provider in providers {
            if let Err(err) = provider.close() {
                warn!(error = %err, "failed to release asset provider");
                failures.push(err);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(AssetError::Release(failures))
        }
    }
}
