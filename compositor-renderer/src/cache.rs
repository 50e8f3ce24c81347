//! Decoded pixel store for image layers.
//!
//! Holds one premultiplied surface per decoded image layer plus the
//! checkerboard placeholders used by the last render pass, keyed by size.

use std::collections::HashMap;

use compositor_core::LayerId;
use tiny_skia::Pixmap;

use crate::error::{RenderError, RenderResult};
use crate::image::{create_placeholder, DecodedImage};

/// Store statistics for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of lookups that found pixels.
    pub hits: u64,
    /// Number of lookups that found nothing.
    pub misses: u64,
    /// Total bytes inserted over the store's lifetime.
    pub bytes_loaded: u64,
    /// Number of placeholders generated.
    pub placeholders_built: u64,
}

/// Decoded pixels for image layers, keyed by layer ID.
#[derive(Default)]
pub struct ImageStore {
    images: HashMap<LayerId, Pixmap>,
    placeholders: HashMap<(u32, u32), Pixmap>,
    current_size: usize,
    stats: StoreStats,
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("images", &self.images.len())
            .field("placeholders", &self.placeholders.len())
            .field("current_size", &self.current_size)
            .field("stats", &self.stats)
            .finish()
    }
}

impl ImageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pixels for a layer, replacing any previous pixels.
    pub fn insert(&mut self, id: LayerId, pixmap: Pixmap) {
        let size_bytes = pixmap.data().len();
        if let Some(old) = self.images.remove(&id) {
            self.current_size -= old.data().len();
        }
        self.current_size += size_bytes;
        self.stats.bytes_loaded += size_bytes as u64;
        self.images.insert(id, pixmap);
    }

    /// Convert and store decoded pixels for a layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoded image cannot be turned into a surface.
    pub fn insert_decoded(&mut self, id: LayerId, image: &DecodedImage) -> RenderResult<()> {
        let pixmap = image.to_pixmap()?;
        tracing::trace!(
            "Storing {:?} pixels ({}x{}) for layer {id}",
            image.format,
            image.width,
            image.height
        );
        self.insert(id, pixmap);
        Ok(())
    }

    /// Pixels for a layer.
    pub fn get(&mut self, id: LayerId) -> Option<&Pixmap> {
        if let Some(pixmap) = self.images.get(&id) {
            self.stats.hits += 1;
            Some(pixmap)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Checkerboard placeholder of the given size, built on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero.
    pub fn placeholder(&mut self, width: u32, height: u32) -> RenderResult<&Pixmap> {
        if !self.placeholders.contains_key(&(width, height)) {
            let pixmap = create_placeholder(width, height).to_pixmap()?;
            self.stats.placeholders_built += 1;
            self.placeholders.insert((width, height), pixmap);
        }
        self.placeholders
            .get(&(width, height))
            .ok_or_else(|| RenderError::Surface("placeholder missing".to_string()))
    }

    /// Drop every placeholder whose size is not in `in_use`.
    ///
    /// Returns the number of placeholders removed.
    pub fn retain_placeholders(&mut self, in_use: &[(u32, u32)]) -> usize {
        let before = self.placeholders.len();
        self.placeholders.retain(|size, _| in_use.contains(size));
        before - self.placeholders.len()
    }

    /// Number of cached placeholders.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.placeholders.len()
    }

    /// Remove a layer's pixels.
    pub fn remove(&mut self, id: LayerId) -> Option<Pixmap> {
        let pixmap = self.images.remove(&id)?;
        self.current_size -= pixmap.data().len();
        Some(pixmap)
    }

    /// Drop pixels for every layer not accepted by `keep`.
    ///
    /// Returns the number of entries removed.
    pub fn retain(&mut self, mut keep: impl FnMut(LayerId) -> bool) -> usize {
        let before = self.images.len();
        self.images.retain(|id, _| keep(*id));
        self.current_size = self.images.values().map(|p| p.data().len()).sum();
        before - self.images.len()
    }

    /// Check if pixels are stored for a layer.
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.images.contains_key(&id)
    }

    /// Number of layers with stored pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if no layer has stored pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Bytes held by layer pixels (placeholders excluded).
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.current_size
    }

    /// Store statistics.
    #[must_use]
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height).expect("non-empty");
        pixmap.fill(tiny_skia::Color::from_rgba8(255, 0, 0, 255));
        pixmap
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = ImageStore::new();
        let id = LayerId::new();
        store.insert(id, solid(10, 10));

        assert!(store.contains(id));
        assert_eq!(store.len(), 1);
        assert_eq!(store.size_bytes(), 400);
        assert_eq!(store.get(id).map(Pixmap::width), Some(10));
        assert_eq!(store.stats().hits, 1);
    }

    #[test]
    fn test_miss_is_counted() {
        let mut store = ImageStore::new();
        assert!(store.get(LayerId::new()).is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_replace_keeps_size_accurate() {
        let mut store = ImageStore::new();
        let id = LayerId::new();
        store.insert(id, solid(10, 10));
        store.insert(id, solid(2, 2));
        assert_eq!(store.size_bytes(), 16);

        store.remove(id);
        assert!(store.is_empty());
        assert_eq!(store.size_bytes(), 0);
    }

    #[test]
    fn test_retain_drops_deleted_layers() {
        let mut store = ImageStore::new();
        let keep = LayerId::new();
        let gone = LayerId::new();
        store.insert(keep, solid(1, 1));
        store.insert(gone, solid(1, 1));

        assert_eq!(store.retain(|id| id == keep), 1);
        assert!(store.contains(keep));
        assert!(!store.contains(gone));
        assert_eq!(store.size_bytes(), 4);
    }

    #[test]
    fn test_placeholder_is_built_once() {
        let mut store = ImageStore::new();
        assert_eq!(store.placeholder(20, 10).unwrap().width(), 20);
        store.placeholder(20, 10).unwrap();
        assert_eq!(store.stats().placeholders_built, 1);
        assert!(store.placeholder(0, 10).is_err());
    }

    #[test]
    fn test_unused_placeholders_are_dropped() {
        let mut store = ImageStore::new();
        store.placeholder(20, 10).unwrap();
        store.placeholder(30, 10).unwrap();
        assert_eq!(store.placeholder_count(), 2);

        assert_eq!(store.retain_placeholders(&[(30, 10)]), 1);
        assert_eq!(store.placeholder_count(), 1);
        assert_eq!(store.retain_placeholders(&[]), 1);
        assert_eq!(store.placeholder_count(), 0);
    }
}
