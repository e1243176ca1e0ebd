mod composite;
mod dir;
mod map;
mod namespaced;
mod text;

#[cfg(test)]
mod testing;

pub use composite::AssetServer;
pub use dir::{DirProvider, MANIFEST_FILE};
pub use map::MapProvider;
pub use namespaced::NamespacedServer;
pub use text::TextServer;
