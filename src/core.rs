pub mod error;
pub mod uri;
pub mod utils;

use std::io::Read;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use error::{AssetError, ParseError};

/// A lazily readable asset body.
pub type AssetStream = Box<dyn Read + Send>;

pub type Result<T> = std::result::Result<T, AssetError>;

/// A backend able to answer asset requests addressed by `<scheme>://<path>` URIs.
///
/// Every lookup has three distinguishable outcomes:
/// * `Ok(Some(value))` - the asset was found;
/// * `Ok(None)` - the provider does not have it;
/// * `Err(_)` - the request was malformed, cancelled, or the provider failed.
///
/// Providers are shared between servers and threads, so all methods take `&self`.
#[async_trait]
pub trait AssetProvider<T: Send + 'static>: Send + Sync {
    /// Fetches the asset at `uri`.
    fn fetch(&self, uri: &str) -> Result<Option<T>>;

    /// Fetches the asset at `uri`, suspending on I/O.
    ///
    /// The default implementation checks `cancel` once and then performs a blocking [`fetch`].
    ///
    /// [`fetch`]: AssetProvider::fetch
    async fn fetch_async(&self, uri: &str, cancel: &CancellationToken) -> Result<Option<T>> {
        if cancel.is_cancelled() {
            return Err(AssetError::Cancelled);
        }
        self.fetch(uri)
    }

    /// Opens the raw bytes of the asset at `uri` for reading.
    fn fetch_stream(&self, uri: &str) -> Result<Option<AssetStream>>;

    /// Returns every URI this provider can serve.
    fn available_assets(&self) -> Result<Vec<String>>;

    /// Releases the resources held by the provider. Must be safe to call more than once.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}
