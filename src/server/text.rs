use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::{AssetProvider, AssetStream, Result};

/// Serves the byte assets of an inner provider decoded as UTF-8 text.
///
/// Assets that are not valid UTF-8 are reported as provider errors, not as missing.
/// The inner provider is shared, so `close()` does not release it.
pub struct TextServer {
    inner: Arc<dyn AssetProvider<Vec<u8>>>,
}

impl TextServer {
    pub fn new(inner: Arc<dyn AssetProvider<Vec<u8>>>) -> Self {
        Self { inner }
    }

    fn decode(uri: &str, bytes: Vec<u8>) -> Result<String> {
        let text = String::from_utf8(bytes)
            .with_context(|| format!("asset '{uri}' is not valid UTF-8"))?;
        Ok(text)
    }
}

#[async_trait]
impl AssetProvider<String> for TextServer {
    fn fetch(&self, uri: &str) -> Result<Option<String>> {
        self.inner
            .fetch(uri)?
            .map(|bytes| Self::decode(uri, bytes))
            .transpose()
    }

    async fn fetch_async(&self, uri: &str, cancel: &CancellationToken) -> Result<Option<String>> {
        self.inner
            .fetch_async(uri, cancel)
            .await?
            .map(|bytes| Self::decode(uri, bytes))
            .transpose()
    }

    fn fetch_stream(&self, uri: &str) -> Result<Option<AssetStream>> {
        self.inner.fetch_stream(uri)
    }

    fn available_assets(&self) -> Result<Vec<String>> {
        self.inner.available_assets()
    }
}
