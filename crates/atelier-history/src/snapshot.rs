//! Snapshot data structures.
//!
//! A [`Snapshot`] is the full editable state of a design at one instant. It is
//! a plain value: equality is structural and nothing mutates it after
//! construction. The `with_*` builders consume and return a new value.

use serde::{Deserialize, Serialize};

/// Position, size and rotation of an element on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }
}

/// Visual attributes of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Fabric or print applied to this element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric_id: Option<String>,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            opacity: default_opacity(),
            fabric_id: None,
        }
    }
}

/// What an element represents on the garment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A cut pattern piece (bodice, sleeve, collar...).
    Panel,
    /// Buttons, zips, lace and other applied trims.
    Trim,
    Shape,
    Text,
    Image,
}

/// A single element of a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignElement {
    /// Stable identity used for diffing.
    pub id: String,
    pub kind: ElementKind,
    pub layer_id: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub style: ElementStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl DesignElement {
    pub fn new(
        id: impl Into<String>,
        kind: ElementKind,
        layer_id: impl Into<String>,
        geometry: Geometry,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            layer_id: layer_id.into(),
            geometry,
            style: ElementStyle::default(),
            text: None,
        }
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A point on a freehand path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A freehand drawing stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingPath {
    pub id: String,
    pub layer_id: String,
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
}

/// A canvas layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub visible: bool,
}

impl Layer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Full editable state of a design at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub elements: Vec<DesignElement>,
    #[serde(default)]
    pub paths: Vec<DrawingPath>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    pub active_layer_id: String,
    /// Currently selected fabric/pattern, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric_id: Option<String>,
}

impl Snapshot {
    /// A blank canvas with a single active layer.
    pub fn blank(layer: Layer) -> Self {
        Self {
            elements: Vec::new(),
            paths: Vec::new(),
            active_layer_id: layer.id.clone(),
            layers: vec![layer],
            fabric_id: None,
        }
    }

    pub fn with_element(mut self, element: DesignElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Replace the element with the same id, or append it.
    pub fn with_element_replaced(mut self, element: DesignElement) -> Self {
        match self.elements.iter_mut().find(|e| e.id == element.id) {
            Some(existing) => *existing = element,
            None => self.elements.push(element),
        }
        self
    }

    pub fn without_element(mut self, id: &str) -> Self {
        self.elements.retain(|e| e.id != id);
        self
    }

    pub fn with_path(mut self, path: DrawingPath) -> Self {
        self.paths.push(path);
        self
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_active_layer(mut self, layer_id: impl Into<String>) -> Self {
        self.active_layer_id = layer_id.into();
        self
    }

    pub fn with_fabric(mut self, fabric_id: Option<String>) -> Self {
        self.fabric_id = fabric_id;
        self
    }

    pub fn element(&self, id: &str) -> Option<&DesignElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.layer(&self.active_layer_id)
    }

    /// True when nothing has been drawn or placed.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.paths.is_empty()
    }

    /// Byte length of the JSON encoding, as persisted.
    pub fn serialized_size(&self) -> serde_json::Result<u64> {
        serde_json::to_vec(self).map(|bytes| bytes.len() as u64)
    }

    /// Locate the first NaN or infinite number, e.g. `element elm_1 x`.
    ///
    /// `serde_json` encodes these as `null`, which does not decode back
    /// into an `f64`.
    pub fn non_finite_field(&self) -> Option<String> {
        for element in &self.elements {
            let g = &element.geometry;
            let fields = [
                ("x", g.x),
                ("y", g.y),
                ("width", g.width),
                ("height", g.height),
                ("rotation", g.rotation),
                ("strokeWidth", element.style.stroke_width),
                ("opacity", element.style.opacity),
            ];
            if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
                return Some(format!("element {} {}", element.id, name));
            }
        }

        for path in &self.paths {
            if !path.width.is_finite() {
                return Some(format!("path {} width", path.id));
            }
            if let Some(index) = path
                .points
                .iter()
                .position(|p| !p.x.is_finite() || !p.y.is_finite())
            {
                return Some(format!("path {} point {}", path.id, index));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Snapshot {
        Snapshot::blank(Layer::new("lyr_base", "Base"))
    }

    fn bodice() -> DesignElement {
        DesignElement::new(
            "elm_bodice",
            ElementKind::Panel,
            "lyr_base",
            Geometry::new(10.0, 20.0, 120.0, 180.0),
        )
    }

    #[test]
    fn test_blank_snapshot_has_active_layer() {
        let snapshot = base();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.active_layer().map(|l| l.name.as_str()), Some("Base"));
    }

    #[test]
    fn test_structural_equality() {
        let a = base().with_element(bodice());
        let b = base().with_element(bodice());
        assert_eq!(a, b);

        let c = base().with_element(bodice()).with_fabric(Some("fab_denim".into()));
        assert_ne!(a, c);
    }

    #[test]
    fn test_builders_do_not_touch_original() {
        let original = base().with_element(bodice());
        let moved = original.clone().with_element_replaced(DesignElement {
            geometry: Geometry::new(40.0, 20.0, 120.0, 180.0),
            ..bodice()
        });

        assert_eq!(original.element("elm_bodice").unwrap().geometry.x, 10.0);
        assert_eq!(moved.element("elm_bodice").unwrap().geometry.x, 40.0);
        assert_eq!(moved.elements.len(), 1);
    }

    #[test]
    fn test_without_element() {
        let snapshot = base().with_element(bodice()).without_element("elm_bodice");
        assert!(snapshot.element("elm_bodice").is_none());
    }

    #[test]
    fn test_json_uses_camel_case() {
        let snapshot = base().with_element(bodice());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["activeLayerId"], "lyr_base");
        assert_eq!(json["elements"][0]["layerId"], "lyr_base");
        assert_eq!(json["elements"][0]["kind"], "panel");
        assert!(json.get("fabricId").is_none());
    }

    #[test]
    fn test_serialized_size_matches_encoding() {
        let snapshot = base().with_element(bodice());
        let expected = serde_json::to_string(&snapshot).unwrap().len() as u64;
        assert_eq!(snapshot.serialized_size().unwrap(), expected);
    }

    #[test]
    fn test_deserialize_fills_style_defaults() {
        let json = r#"{
            "elements": [{
                "id": "elm_1",
                "kind": "trim",
                "layerId": "lyr_1",
                "geometry": {"x": 1, "y": 2, "width": 3, "height": 4}
            }],
            "activeLayerId": "lyr_1"
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let element = snapshot.element("elm_1").unwrap();
        assert_eq!(element.style.opacity, 1.0);
        assert_eq!(element.geometry.rotation, 0.0);
        assert!(snapshot.layers.is_empty());
    }

    #[test]
    fn test_non_finite_field() {
        assert_eq!(base().with_element(bodice()).non_finite_field(), None);

        let rotated = DesignElement {
            geometry: bodice().geometry.rotated(f64::NAN),
            ..bodice()
        };
        assert_eq!(
            base().with_element(rotated).non_finite_field().as_deref(),
            Some("element elm_bodice rotation")
        );

        let stroke = DrawingPath {
            id: "pth_hem".into(),
            layer_id: "lyr_base".into(),
            points: vec![Point { x: 0.0, y: 0.0 }, Point { x: f64::NEG_INFINITY, y: 1.0 }],
            color: "#000000".into(),
            width: 2.0,
        };
        assert_eq!(
            base().with_path(stroke).non_finite_field().as_deref(),
            Some("path pth_hem point 1")
        );
    }
}
