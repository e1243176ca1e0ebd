//! A lightweight, extensible set of URI-addressed asset servers for Rust.
//! Callers ask for `<scheme>://<path>` and get the asset back, without knowing which backend
//! (in-memory map, host directory, archive, network store...) actually holds it.
//!
//! ### Overview
//!
//! `asset-kit` defines the generic `AssetProvider` trait and the pieces that combine providers:
//! - `AssetServer` queries an ordered list of providers, expanding bare names with search
//!   extensions, and returns the first match;
//! - `NamespacedServer` exposes a `<namespace>/...` sub-tree of another provider as its root;
//! - `MapProvider`, `DirProvider` and `TextServer` are ready-made providers.
//!
//! **Key ideas**:
//! - **Abstraction**: Work with different kinds of storage through a single trait.
//! - **Ordered fallback**: The first registered provider that has the asset wins.
//! - **Distinct outcomes**: Found (`Ok(Some)`), missing (`Ok(None)`) and failed (`Err`) are
//!   never confused; a malformed URI is an error, not a miss.
//! - **Concurrency**: Providers can be added and removed while lookups are running.
//! - **Extensibility**: Plug in your own storage by implementing `AssetProvider`.

mod core;
mod server;

pub use crate::core::uri::{Uri, is_valid_scheme};
pub use crate::core::utils::SYSTEM_NAME_IGNORE_LIST;
pub use crate::core::{AssetError, AssetProvider, AssetStream, ParseError, Result};
pub use server::{AssetServer, DirProvider, MANIFEST_FILE, MapProvider, NamespacedServer, TextServer};

pub use tokio_util::sync::CancellationToken;
