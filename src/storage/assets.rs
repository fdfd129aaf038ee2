//! Resolving selection identifiers to sprite bytes.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Resource name of the sprite for `id`, e.g. `"025.gif"`.
pub fn asset_name(id: u32) -> String {
    format!("{id:03}.gif")
}

/// Source of sprite bytes keyed by identifier.
pub trait AssetSource {
    /// Bytes of the sprite for `id`, or `None` if there is no such asset.
    fn load(&self, id: u32) -> Option<Vec<u8>>;
}

/// Sprites stored as `NNN.gif` files in one directory.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, id: u32) -> PathBuf {
        self.root.join(asset_name(id))
    }
}

impl AssetSource for DirAssets {
    fn load(&self, id: u32) -> Option<Vec<u8>> {
        let path = self.path_for(id);
        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No sprite for id {} at {}", id, path.display());
                None
            }
            Err(e) => {
                log::warn!("Failed to read sprite {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Sprites held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    sprites: HashMap<u32, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, bytes: Vec<u8>) {
        self.sprites.insert(id, bytes);
    }

    pub fn with(mut self, id: u32, bytes: Vec<u8>) -> Self {
        self.insert(id, bytes);
        self
    }
}

impl AssetSource for MemoryAssets {
    fn load(&self, id: u32) -> Option<Vec<u8>> {
        self.sprites.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_asset_name_is_zero_padded() {
        assert_eq!(asset_name(1), "001.gif");
        assert_eq!(asset_name(25), "025.gif");
        assert_eq!(asset_name(251), "251.gif");
    }

    #[test]
    fn test_dir_assets() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("007.gif"), b"GIF89a").unwrap();

        let assets = DirAssets::new(dir.path());
        assert_eq!(assets.load(7).as_deref(), Some(&b"GIF89a"[..]));
        assert!(assets.load(8).is_none());
    }

    #[test]
    fn test_memory_assets() {
        let assets = MemoryAssets::new().with(3, vec![1, 2, 3]);
        assert_eq!(assets.load(3), Some(vec![1, 2, 3]));
        assert_eq!(assets.load(4), None);
    }
}
