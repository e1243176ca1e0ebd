//! Instrumented providers shared by the server tests.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::core::{AssetProvider, AssetStream, Result};

/// Records every URI it is asked for into a shared journal, so tests can check probe order.
pub struct StubProvider {
    pub name: &'static str,
    assets: BTreeMap<String, String>,
    journal: Arc<Mutex<Vec<String>>>,
    closes: AtomicUsize,
    fail_fetch: bool,
    fail_close: bool,
    delay: Option<Duration>,
}

impl StubProvider {
    pub fn new(name: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            assets: BTreeMap::new(),
            journal: journal.clone(),
            closes: AtomicUsize::new(0),
            fail_fetch: false,
            fail_close: false,
            delay: None,
        }
    }

    /// Creates a stub with a private journal.
    pub fn detached(name: &'static str) -> Self {
        Self::new(name, &Arc::new(Mutex::new(Vec::new())))
    }

    pub fn with_asset(mut self, uri: &str, content: &str) -> Self {
        self.assets.insert(uri.to_string(), content.to_string());
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn lookup(&self, uri: &str) -> Result<Option<String>> {
        self.journal.lock().push(format!("{}:{}", self.name, uri));
        if self.fail_fetch {
            return Err(anyhow!("{} is broken", self.name).into());
        }
        Ok(self.assets.get(uri).cloned())
    }
}

#[async_trait]
impl AssetProvider<String> for StubProvider {
    fn fetch(&self, uri: &str) -> Result<Option<String>> {
        self.lookup(uri)
    }

    async fn fetch_async(&self, uri: &str, _cancel: &CancellationToken) -> Result<Option<String>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.lookup(uri)
    }

    fn fetch_stream(&self, uri: &str) -> Result<Option<AssetStream>> {
        Ok(self
            .lookup(uri)?
            .map(|content| Box::new(Cursor::new(content.into_bytes())) as AssetStream))
    }

    fn available_assets(&self) -> Result<Vec<String>> {
        Ok(self.assets.keys().cloned().collect())
    }

    fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(anyhow!("{} refused to close", self.name).into());
        }
        Ok(())
    }
}

pub fn journal() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}
