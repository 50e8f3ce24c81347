//! The composition document: canvas config plus ordered text and image layers.

use std::collections::HashMap;

use crate::{
    CanvasConfig, CompositorError, CompositorResult, ImageLayer, LayerId, TextLayer,
};

/// A composition containing all layers.
///
/// Layers are stored by ID with a separate insertion-order list per kind.
/// Insertion order is paint order: later layers are drawn on top. All image
/// layers are painted below all text layers.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Canvas size and background.
    canvas: CanvasConfig,
    /// Text layers, indexed by ID.
    texts: HashMap<LayerId, TextLayer>,
    /// Text paint order.
    text_order: Vec<LayerId>,
    /// Image layers, indexed by ID.
    images: HashMap<LayerId, ImageLayer>,
    /// Image paint order.
    image_order: Vec<LayerId>,
    /// Bumped on every mutation.
    revision: u64,
}

impl Document {
    /// Create an empty document with the given canvas.
    #[must_use]
    pub fn new(canvas: CanvasConfig) -> Self {
        Self {
            canvas,
            ..Self::default()
        }
    }

    /// Current canvas config.
    #[must_use]
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    /// Replace the canvas config.
    pub fn set_canvas(&mut self, canvas: CanvasConfig) {
        if self.canvas != canvas {
            self.canvas = canvas;
            self.touch();
        }
    }

    /// Monotonic mutation counter; a changed value means a redraw is due.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Append a text layer on top of the existing ones.
    pub fn add_text(&mut self, layer: TextLayer) -> LayerId {
        let id = layer.id;
        self.text_order.push(id);
        self.texts.insert(id, layer);
        self.touch();
        id
    }

    /// Append an image layer on top of the existing ones.
    pub fn add_image(&mut self, layer: ImageLayer) -> LayerId {
        let id = layer.id;
        self.image_order.push(id);
        self.images.insert(id, layer);
        self.touch();
        id
    }

    /// Remove a text layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is not found.
    pub fn remove_text(&mut self, id: LayerId) -> CompositorResult<TextLayer> {
        let layer = self
            .texts
            .remove(&id)
            .ok_or_else(|| CompositorError::LayerNotFound(id.to_string()))?;
        self.text_order.retain(|&lid| lid != id);
        self.touch();
        Ok(layer)
    }

    /// Remove an image layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is not found.
    pub fn remove_image(&mut self, id: LayerId) -> CompositorResult<ImageLayer> {
        let layer = self
            .images
            .remove(&id)
            .ok_or_else(|| CompositorError::LayerNotFound(id.to_string()))?;
        self.image_order.retain(|&lid| lid != id);
        self.touch();
        Ok(layer)
    }

    /// Get a text layer by ID.
    #[must_use]
    pub fn text(&self, id: LayerId) -> Option<&TextLayer> {
        self.texts.get(&id)
    }

    /// Get an image layer by ID.
    #[must_use]
    pub fn image(&self, id: LayerId) -> Option<&ImageLayer> {
        self.images.get(&id)
    }

    /// Mutate a text layer in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is not found.
    pub fn update_text<F, R>(&mut self, id: LayerId, f: F) -> CompositorResult<R>
    where
        F: FnOnce(&mut TextLayer) -> R,
    {
        let layer = self
            .texts
            .get_mut(&id)
            .ok_or_else(|| CompositorError::LayerNotFound(id.to_string()))?;
        let result = f(layer);
        self.touch();
        Ok(result)
    }

    /// Mutate an image layer in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is not found.
    pub fn update_image<F, R>(&mut self, id: LayerId, f: F) -> CompositorResult<R>
    where
        F: FnOnce(&mut ImageLayer) -> R,
    {
        let layer = self
            .images
            .get_mut(&id)
            .ok_or_else(|| CompositorError::LayerNotFound(id.to_string()))?;
        let result = f(layer);
        self.touch();
        Ok(result)
    }

    /// Text layers in paint order (bottom first).
    pub fn texts(&self) -> impl DoubleEndedIterator<Item = &TextLayer> {
        self.text_order.iter().filter_map(|id| self.texts.get(id))
    }

    /// Image layers in paint order (bottom first).
    pub fn images(&self) -> impl DoubleEndedIterator<Item = &ImageLayer> {
        self.image_order.iter().filter_map(|id| self.images.get(id))
    }

    /// Paint position of a text layer, derived from the current order.
    #[must_use]
    pub fn text_index(&self, id: LayerId) -> Option<usize> {
        self.text_order.iter().position(|&lid| lid == id)
    }

    /// Paint position of an image layer, derived from the current order.
    #[must_use]
    pub fn image_index(&self, id: LayerId) -> Option<usize> {
        self.image_order.iter().position(|&lid| lid == id)
    }

    /// Number of text layers.
    #[must_use]
    pub fn text_count(&self) -> usize {
        self.text_order.len()
    }

    /// Number of image layers.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.image_order.len()
    }

    /// Check if the document has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_order.is_empty() && self.image_order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn text(content: &str) -> TextLayer {
        TextLayer::new(Point::new(10.0, 10.0), "Arial").with_content(content)
    }

    #[test]
    fn test_document_add_remove() {
        let mut doc = Document::default();
        assert!(doc.is_empty());

        let id = doc.add_text(text("Hello"));
        assert_eq!(doc.text_count(), 1);
        assert!(doc.text(id).is_some());

        doc.remove_text(id).expect("should remove");
        assert!(doc.is_empty());
        assert!(doc.remove_text(id).is_err());
    }

    #[test]
    fn test_insertion_order_is_paint_order() {
        let mut doc = Document::default();
        let a = doc.add_text(text("a"));
        let b = doc.add_text(text("b"));
        let c = doc.add_text(text("c"));

        let order: Vec<_> = doc.texts().map(|t| t.content.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);

        doc.remove_text(b).unwrap();
        let order: Vec<_> = doc.texts().map(|t| t.content.as_str()).collect();
        assert_eq!(order, ["a", "c"]);
        assert_eq!(doc.text_index(a), Some(0));
        assert_eq!(doc.text_index(c), Some(1));
        assert_eq!(doc.text_index(b), None);
    }

    #[test]
    fn test_revision_bumps_on_mutation() {
        let mut doc = Document::default();
        let r0 = doc.revision();
        let id = doc.add_image(ImageLayer::fit_to_canvas("a.png", 10, 10, 300, 300));
        let r1 = doc.revision();
        assert!(r1 > r0);

        doc.update_image(id, |img| img.x = 5.0).unwrap();
        assert!(doc.revision() > r1);

        let r2 = doc.revision();
        doc.set_canvas(*doc.canvas());
        assert_eq!(doc.revision(), r2, "unchanged canvas should not bump");
    }

    #[test]
    fn test_update_missing_layer_fails() {
        let mut doc = Document::default();
        let result = doc.update_text(LayerId::new(), |t| t.x = 1.0);
        assert!(matches!(result, Err(CompositorError::LayerNotFound(_))));
    }
}
