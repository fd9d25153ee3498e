//! Builder patterns for constructing test objects.
//!
//! Provides fluent builders for snapshots commonly used in tests.

use atelier_history::snapshot::{
    DesignElement, DrawingPath, ElementKind, ElementStyle, Geometry, Layer, Point, Snapshot,
};

/// Id of the layer every built snapshot starts with.
pub const BASE_LAYER_ID: &str = "lyr_base";

/// Builder for constructing test snapshots.
///
/// Elements are placed on the active layer in insertion order, each one
/// offset so no two share a geometry.
///
/// # Example
///
/// ```rust
/// use atelier_test_utils::builders::SnapshotBuilder;
///
/// let snapshot = SnapshotBuilder::new()
///     .panel("elm_bodice")
///     .trim("elm_buttons")
///     .fabric("fab_linen")
///     .build();
///
/// assert_eq!(snapshot.elements.len(), 2);
/// assert_eq!(snapshot.fabric_id.as_deref(), Some("fab_linen"));
/// ```
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    /// Start from a blank canvas with a single base layer.
    pub fn new() -> Self {
        Self {
            snapshot: Snapshot::blank(Layer::new(BASE_LAYER_ID, "Base")),
        }
    }

    /// Add a pattern panel.
    pub fn panel(self, id: &str) -> Self {
        self.element(id, ElementKind::Panel)
    }

    /// Add a trim.
    pub fn trim(self, id: &str) -> Self {
        self.element(id, ElementKind::Trim)
    }

    /// Add a text label.
    pub fn text(self, id: &str, text: &str) -> Self {
        let element = self.next_element(id, ElementKind::Text).with_text(text);
        self.with(element)
    }

    /// Add an element of any kind.
    pub fn element(self, id: &str, kind: ElementKind) -> Self {
        let element = self.next_element(id, kind);
        self.with(element)
    }

    /// Add a fully specified element.
    pub fn with(mut self, element: DesignElement) -> Self {
        self.snapshot = self.snapshot.with_element(element);
        self
    }

    /// Add a freehand stroke through `points`.
    pub fn stroke(mut self, id: &str, points: &[(f64, f64)]) -> Self {
        let path = DrawingPath {
            id: id.to_string(),
            layer_id: self.snapshot.active_layer_id.clone(),
            points: points.iter().map(|&(x, y)| Point { x, y }).collect(),
            color: "#1f1f1f".to_string(),
            width: 2.0,
        };
        self.snapshot = self.snapshot.with_path(path);
        self
    }

    /// Add a layer and make it active.
    pub fn layer(mut self, id: &str, name: &str) -> Self {
        self.snapshot = self
            .snapshot
            .with_layer(Layer::new(id, name))
            .with_active_layer(id);
        self
    }

    /// Select a fabric.
    pub fn fabric(mut self, fabric_id: &str) -> Self {
        self.snapshot = self.snapshot.with_fabric(Some(fabric_id.to_string()));
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> Snapshot {
        self.snapshot
    }

    fn next_element(&self, id: &str, kind: ElementKind) -> DesignElement {
        let offset = self.snapshot.elements.len() as f64 * 10.0;
        DesignElement::new(
            id,
            kind,
            self.snapshot.active_layer_id.clone(),
            Geometry::new(offset, offset, 100.0, 150.0),
        )
        .with_style(ElementStyle {
            fill: Some("#f4e9dc".to_string()),
            ..ElementStyle::default()
        })
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}
