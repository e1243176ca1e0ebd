//! This module provides an asset provider that keeps its assets in memory.

use std::collections::BTreeMap;
use std::io::Cursor;

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::trace;

use crate::core::uri::{Uri, is_valid_scheme};
use crate::core::{AssetError, AssetProvider, AssetStream, Result, utils};

/// An asset provider that stores assets of one scheme in memory, keyed by normalized path.
///
/// ### Internal state
///
/// * `scheme` — the kebab-case scheme this provider answers to. Requests for any other scheme
///   are answered with `None`.
/// * `entries` — asset values keyed by **normalized paths**: no leading or trailing `/`, no
///   empty, `.` or `..` segments. `BTreeMap` keeps `available_assets()` deterministic.
///
/// ### Thread Safety
///
/// Entries are guarded by a `RwLock`, so the provider can be shared through an `Arc` and filled
/// while it is already registered in an [`AssetServer`](crate::AssetServer).
///
/// ### Example
///
/// ```no_run
/// use asset_kit::{AssetProvider, MapProvider};
///
/// let fonts: MapProvider = MapProvider::new("fonts").unwrap();
/// fonts.insert("/mono/regular.ttf", b"\x00\x01".to_vec()).unwrap();
///
/// assert!(fonts.contains("mono/regular.ttf"));
/// assert_eq!(fonts.available_assets().unwrap(), vec!["fonts://mono/regular.ttf"]);
/// ```
pub struct MapProvider<T = Vec<u8>> {
    scheme: String,
    entries: RwLock<BTreeMap<String, T>>,
}

impl<T> MapProvider<T>
where
    T: Clone + AsRef<[u8]> + Send + Sync + 'static,
{
    /// Creates an empty provider for `scheme`.
    /// Returns [`AssetError::InvalidScheme`] if `scheme` is not kebab-case.
    pub fn new(scheme: &str) -> Result<Self> {
        if !is_valid_scheme(scheme) {
            return Err(AssetError::InvalidScheme(scheme.to_string()));
        }
        Ok(Self {
            scheme: scheme.to_string(),
            entries: RwLock::new(BTreeMap::new()),
        })
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_entry(self, path: &str, content: T) -> Result<Self> {
        self.insert(path, content)?;
        Ok(self)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Stores `content` at `path`, replacing and returning the previous value.
    /// * `path` is normalized first; it must not be empty or climb above the top level.
    pub fn insert(&self, path: &str, content: T) -> Result<Option<T>> {
        let key = Self::key(path)?;
        Ok(self.entries.write().insert(key, content))
    }

    /// Removes the asset at `path`. Returns `None` if there was none.
    pub fn remove(&self, path: &str) -> Option<T> {
        let key = Self::key(path).ok()?;
        self.entries.write().remove(&key)
    }

    pub fn contains(&self, path: &str) -> bool {
        match Self::key(path) {
            Ok(key) => self.entries.read().contains_key(&key),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn key(path: &str) -> Result<String> {
        match utils::normalize(path) {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(anyhow!("invalid asset path: {path:?}").into()),
        }
    }

    /// Returns the value stored for `uri`, or `None` for a foreign scheme or unknown path.
    fn get(&self, uri: &str) -> Result<Option<T>> {
        let uri = Uri::parse(uri)?;
        if uri.scheme() != self.scheme {
            trace!(scheme = uri.scheme(), expected = %self.scheme, "foreign scheme");
            return Ok(None);
        }
        let Some(key) = utils::normalize(uri.path()) else {
            return Ok(None);
        };
        Ok(self.entries.read().get(&key).cloned())
    }
}

#[async_trait]
impl<T> AssetProvider<T> for MapProvider<T>
where
    T: Clone + AsRef<[u8]> + Send + Sync + 'static,
{
    fn fetch(&self, uri: &str) -> Result<Option<T>> {
        self.get(uri)
    }

    fn fetch_stream(&self, uri: &str) -> Result<Option<AssetStream>> {
        Ok(self
            .get(uri)?
            .map(|content| Box::new(Cursor::new(content)) as AssetStream))
    }

    fn available_assets(&self) -> Result<Vec<String>> {
        let assets: Vec<String> = self
            .entries
            .read()
            .keys()
            .map(|path| format!("{}://{}", self.scheme, path))
            .collect();
        Ok(utils::exclude_system_names(assets).collect())
    }

    /// Drops every stored asset.
    fn close(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tokio_util::sync::CancellationToken;

    /// Helper to create a pre‑populated provider for testing
    fn setup_provider() -> MapProvider {
        let provider: MapProvider = MapProvider::new("data").unwrap();
        provider.insert("/readme.md", b"Project docs".to_vec()).unwrap();
        provider.insert("config/app.json", b"{}".to_vec()).unwrap();
        provider.insert("bin/blob.bin", vec![0x00, 0x01, 0x02]).unwrap();
        provider.insert("empty.txt", Vec::new()).unwrap();
        provider
    }

    mod creations {
        use super::*;

        #[test]
        fn test_new_map_provider() -> Result<()> {
            let provider: MapProvider = MapProvider::new("my-data")?;
            assert_eq!(provider.scheme(), "my-data");
            assert!(provider.is_empty());
            Ok(())
        }

        #[test]
        fn test_new_invalid_scheme() {
            for scheme in ["", "Data", "data1", "-data", "da--ta"] {
                let result = MapProvider::<Vec<u8>>::new(scheme);
                assert!(
                    matches!(result, Err(AssetError::InvalidScheme(_))),
                    "scheme: {scheme:?}"
                );
            }
        }

        #[test]
        fn test_with_entry() -> Result<()> {
            let provider = MapProvider::<String>::new("text")?
                .with_entry("a", "first".to_string())?
                .with_entry("b", "second".to_string())?;
            assert_eq!(provider.len(), 2);
            assert_eq!(provider.fetch("text://b")?.as_deref(), Some("second"));
            Ok(())
        }
    }

    mod insert {
        use super::*;

        #[test]
        fn test_insert_normalizes_path() -> Result<()> {
            let provider = setup_provider();
            assert!(provider.contains("readme.md"));
            assert!(provider.contains("/config//app.json"));
            assert!(provider.contains("config/./app.json"));
            assert!(provider.contains("bin/../readme.md"));
            Ok(())
        }

        #[test]
        fn test_insert_replaces_existing() -> Result<()> {
            let provider = setup_provider();
            let previous = provider.insert("readme.md", b"New docs".to_vec())?;
            assert_eq!(previous.as_deref(), Some(&b"Project docs"[..]));
            assert_eq!(provider.fetch("data://readme.md")?, Some(b"New docs".to_vec()));
            Ok(())
        }

        #[test]
        fn test_insert_invalid_path() {
            let provider = setup_provider();
            for path in ["", "/", "  ", "..", "a/../.."] {
                let result = provider.insert(path, Vec::new());
                assert!(
                    result.unwrap_err().to_string().contains("invalid asset path"),
                    "path: {path:?}"
                );
            }
        }

        #[test]
        fn test_remove() {
            let provider = setup_provider();
            assert_eq!(provider.remove("/readme.md"), Some(b"Project docs".to_vec()));
            assert_eq!(provider.remove("readme.md"), None);
            assert_eq!(provider.remove(".."), None);
            assert_eq!(provider.len(), 3);
        }
    }

    mod fetch {
        use super::*;

        #[test]
        fn test_fetch_existing() -> Result<()> {
            let provider = setup_provider();
            assert_eq!(provider.fetch("data://readme.md")?, Some(b"Project docs".to_vec()));
            assert_eq!(provider.fetch("data://bin/blob.bin")?, Some(vec![0x00, 0x01, 0x02]));
            assert_eq!(provider.fetch("data://empty.txt")?, Some(Vec::new()));
            Ok(())
        }

        #[test]
        fn test_fetch_missing() -> Result<()> {
            let provider = setup_provider();
            assert_eq!(provider.fetch("data://nonexistent.txt")?, None);
            assert_eq!(provider.fetch("data://config")?, None);
            assert_eq!(provider.fetch("data://../readme.md")?, None);
            Ok(())
        }

        #[test]
        fn test_fetch_foreign_scheme() -> Result<()> {
            let provider = setup_provider();
            assert_eq!(provider.fetch("other://readme.md")?, None);
            Ok(())
        }

        #[test]
        fn test_fetch_invalid_uri() {
            let provider = setup_provider();
            assert!(matches!(
                provider.fetch("readme.md"),
                Err(AssetError::InvalidUri(_))
            ));
        }

        #[test]
        fn test_fetch_stream() -> Result<()> {
            let provider = setup_provider();
            let mut content = Vec::new();
            provider
                .fetch_stream("data://config/app.json")?
                .expect("stream")
                .read_to_end(&mut content)?;
            assert_eq!(content, b"{}");
            assert!(provider.fetch_stream("data://missing")?.is_none());
            Ok(())
        }

        #[tokio::test]
        async fn test_fetch_async_default() -> Result<()> {
            let provider = setup_provider();
            let cancel = CancellationToken::new();
            let found = provider.fetch_async("data://readme.md", &cancel).await?;
            assert_eq!(found, Some(b"Project docs".to_vec()));

            cancel.cancel();
            let result = provider.fetch_async("data://readme.md", &cancel).await;
            assert!(matches!(result, Err(AssetError::Cancelled)));
            Ok(())
        }
    }

    mod available_assets {
        use super::*;

        #[test]
        fn test_available_assets_sorted() -> Result<()> {
            let provider = setup_provider();
            assert_eq!(
                provider.available_assets()?,
                vec![
                    "data://bin/blob.bin",
                    "data://config/app.json",
                    "data://empty.txt",
                    "data://readme.md",
                ]
            );
            Ok(())
        }

        #[test]
        fn test_available_assets_without_system_names() -> Result<()> {
            let provider = setup_provider();
            provider.insert("photos/Thumbs.db", Vec::new())?;
            provider.insert(".DS_Store", Vec::new())?;
            assert_eq!(provider.available_assets()?.len(), 4);
            Ok(())
        }

        #[test]
        fn test_close_clears_entries() -> Result<()> {
            let provider = setup_provider();
            provider.close()?;
            provider.close()?;
            assert!(provider.is_empty());
            assert!(provider.available_assets()?.is_empty());
            Ok(())
        }
    }
}
