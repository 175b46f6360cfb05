use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::watermark::WatermarkSettings;

/// Identity of an open source image
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageKey(PathBuf);

impl ImageKey {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for ImageKey {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for ImageKey {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

/// One [`WatermarkSettings`] per open image
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    entries: HashMap<ImageKey, WatermarkSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ImageKey) -> Option<&WatermarkSettings> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: ImageKey, settings: WatermarkSettings) {
        self.entries.insert(key, settings);
    }

    /// Stored settings for `key`, created from `defaults` on first access
    pub fn get_or_insert(&mut self, key: &ImageKey, defaults: &WatermarkSettings) -> &WatermarkSettings {
        self.entries
            .entry(key.clone())
            .or_insert_with(|| defaults.clone())
    }

    pub fn remove(&mut self, key: &ImageKey) -> Option<WatermarkSettings> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &ImageKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
