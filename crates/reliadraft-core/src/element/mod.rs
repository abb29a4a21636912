//! Scene element definitions.
//!
//! Every element shares a common frame, style and versioning header, and
//! carries its variant-specific data in [`ElementKind`]. The set of variants
//! is closed: code that dispatches on the kind matches exhaustively.

mod block;
mod distribution;
mod freedraw;
mod image;
mod linear;
mod text;

pub use block::{BlockElement, PreventiveMaintenanceType, Units};
pub use distribution::{Distribution, DistributionError, DistributionName};
pub use freedraw::FreeDrawElement;
pub use image::{ImageElement, ImageStatus};
pub use linear::{Arrowhead, ConnectorEnd, LinearElement, PointBinding};
pub(crate) use linear::size_from_points;
pub use text::{TextAlign, TextElement, VerticalAlign};

use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable, opaque element identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a group an element belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

/// Fill style for closed shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillStyle {
    #[default]
    Hachure,
    CrossHatch,
    Solid,
}

/// Stroke dash style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Visual attributes shared by all elements. Renderers read these; the
/// engine only carries them through mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    pub stroke_color: SerializableColor,
    /// Background fill (None = transparent).
    pub background_color: Option<SerializableColor>,
    pub fill_style: FillStyle,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
    /// Hand-drawn roughness (0 = architect, 1 = artist, 2 = cartoonist).
    pub roughness: f64,
    /// Opacity in percent (0-100).
    pub opacity: f64,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            background_color: None,
            fill_style: FillStyle::default(),
            stroke_width: 1.0,
            stroke_style: StrokeStyle::default(),
            roughness: 1.0,
            opacity: 100.0,
        }
    }
}

/// Kind of a back-reference stored in [`Element::bound_elements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundElementKind {
    Arrow,
    Text,
    Connector,
}

/// Weak back-reference to an element bound to this one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundElement {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: BoundElementKind,
}

/// Discriminator of an element variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Selection,
    Rectangle,
    Diamond,
    Ellipse,
    Text,
    Line,
    Arrow,
    Connector,
    FreeDraw,
    Image,
    Block,
}

impl ElementType {
    /// Linear types size from a point list and snap their angle when drawn
    /// with a locked aspect.
    pub fn is_linear(self) -> bool {
        matches!(self, ElementType::Line | ElementType::Arrow | ElementType::Connector)
    }
}

/// Variant-specific element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Selection,
    Rectangle,
    Diamond,
    Ellipse,
    Text(TextElement),
    Line(LinearElement),
    Arrow(LinearElement),
    Connector(LinearElement),
    #[serde(rename = "freedraw")]
    FreeDraw(FreeDrawElement),
    Image(ImageElement),
    Block(BlockElement),
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Selection => ElementType::Selection,
            ElementKind::Rectangle => ElementType::Rectangle,
            ElementKind::Diamond => ElementType::Diamond,
            ElementKind::Ellipse => ElementType::Ellipse,
            ElementKind::Text(_) => ElementType::Text,
            ElementKind::Line(_) => ElementType::Line,
            ElementKind::Arrow(_) => ElementType::Arrow,
            ElementKind::Connector(_) => ElementType::Connector,
            ElementKind::FreeDraw(_) => ElementType::FreeDraw,
            ElementKind::Image(_) => ElementType::Image,
            ElementKind::Block(_) => ElementType::Block,
        }
    }
}

/// A scene element.
///
/// Identity and versioning fields are only readable from outside the crate;
/// every change after creation goes through [`crate::mutation::mutate_element`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub(crate) id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians around the frame center.
    pub angle: f64,
    #[serde(flatten)]
    pub style: ElementStyle,
    pub(crate) seed: u32,
    pub(crate) version: u32,
    pub(crate) version_nonce: u32,
    pub is_deleted: bool,
    /// Group memberships, deepest group first.
    pub group_ids: Vec<GroupId>,
    /// Elements bound to this one (connectors, arrows, label text).
    pub bound_elements: Vec<BoundElement>,
    /// Epoch milliseconds of the last update.
    pub(crate) updated: u64,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create a new element with a fresh id, seed and nonce at version 1.
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: ElementId::random(),
            x,
            y,
            width,
            height,
            angle: 0.0,
            style: ElementStyle::default(),
            seed: generate_seed(),
            version: 1,
            version_nonce: crate::mutation::random_nonce(),
            is_deleted: false,
            group_ids: Vec::new(),
            bound_elements: Vec::new(),
            updated: crate::mutation::now_millis(),
            kind,
        }
    }

    /// Create a rectangle.
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Rectangle, x, y, width, height)
    }

    /// Create a reliability block with the given attributes.
    pub fn block(x: f64, y: f64, width: f64, height: f64, block: BlockElement) -> Self {
        Self::new(ElementKind::Block(block), x, y, width, height)
    }

    /// Create a connector anchored at `(x, y)` with points relative to it.
    pub fn connector(x: f64, y: f64, points: Vec<Point>) -> Self {
        let linear = LinearElement::new(points);
        let (width, height) = linear.size();
        Self::new(ElementKind::Connector(linear), x, y, width, height)
    }

    /// Create an arrow anchored at `(x, y)` with points relative to it.
    pub fn arrow(x: f64, y: f64, points: Vec<Point>) -> Self {
        let linear = LinearElement::new(points).with_end_arrowhead(Some(Arrowhead::Arrow));
        let (width, height) = linear.size();
        Self::new(ElementKind::Arrow(linear), x, y, width, height)
    }

    /// Create a text element.
    pub fn text(x: f64, y: f64, text: impl Into<String>, font_size: f64) -> Self {
        let text = TextElement::new(text, font_size);
        let (width, height) = text.measure();
        Self::new(ElementKind::Text(text), x, y, width, height)
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn version_nonce(&self) -> u32 {
        self.version_nonce
    }

    pub fn updated(&self) -> u64 {
        self.updated
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, ElementKind::Block(_))
    }

    pub fn is_connector(&self) -> bool {
        matches!(self.kind, ElementKind::Connector(_))
    }

    /// Whether linear elements may bind to this element.
    pub fn is_bindable(&self) -> bool {
        match self.kind {
            ElementKind::Rectangle
            | ElementKind::Diamond
            | ElementKind::Ellipse
            | ElementKind::Text(_)
            | ElementKind::Image(_)
            | ElementKind::Block(_) => true,
            ElementKind::Selection
            | ElementKind::Line(_)
            | ElementKind::Arrow(_)
            | ElementKind::Connector(_)
            | ElementKind::FreeDraw(_) => false,
        }
    }

    /// Whether this element may own a bound text label.
    pub fn is_text_container(&self) -> bool {
        match self.kind {
            ElementKind::Rectangle
            | ElementKind::Diamond
            | ElementKind::Ellipse
            | ElementKind::Block(_) => true,
            ElementKind::Selection
            | ElementKind::Text(_)
            | ElementKind::Line(_)
            | ElementKind::Arrow(_)
            | ElementKind::Connector(_)
            | ElementKind::FreeDraw(_)
            | ElementKind::Image(_) => false,
        }
    }

    pub fn as_linear(&self) -> Option<&LinearElement> {
        match &self.kind {
            ElementKind::Line(l) | ElementKind::Arrow(l) | ElementKind::Connector(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&BlockElement> {
        match &self.kind {
            ElementKind::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match &self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Center of the element frame.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Id of the bound text label, if this element owns one.
    pub fn bound_text_id(&self) -> Option<&ElementId> {
        self.bound_elements
            .iter()
            .find(|b| b.kind == BoundElementKind::Text)
            .map(|b| &b.id)
    }

    /// Ids of the elements this element points at (blocks, containers,
    /// bindable shapes). These are the forward half of every binding.
    pub fn anchors(&self) -> Vec<ElementId> {
        let mut anchors = Vec::new();
        match &self.kind {
            ElementKind::Line(l) | ElementKind::Arrow(l) | ElementKind::Connector(l) => {
                anchors.extend(l.start_block_id.iter().cloned());
                anchors.extend(l.end_block_id.iter().cloned());
                anchors.extend(l.start_binding.iter().map(|b| b.element_id.clone()));
                anchors.extend(l.end_binding.iter().map(|b| b.element_id.clone()));
            }
            ElementKind::Text(t) => anchors.extend(t.container_id.iter().cloned()),
            ElementKind::Selection
            | ElementKind::Rectangle
            | ElementKind::Diamond
            | ElementKind::Ellipse
            | ElementKind::FreeDraw(_)
            | ElementKind::Image(_)
            | ElementKind::Block(_) => {}
        }
        anchors.sort();
        anchors.dedup();
        anchors
    }

    /// Axis-aligned bounds in scene coordinates, including rotation.
    pub fn bounds(&self) -> Rect {
        let unrotated = match &self.kind {
            ElementKind::Line(l) | ElementKind::Arrow(l) | ElementKind::Connector(l) => {
                points_bounds(self.x, self.y, &l.points)
            }
            ElementKind::FreeDraw(f) => points_bounds(self.x, self.y, &f.points),
            ElementKind::Selection
            | ElementKind::Rectangle
            | ElementKind::Diamond
            | ElementKind::Ellipse
            | ElementKind::Text(_)
            | ElementKind::Image(_)
            | ElementKind::Block(_) => {
                Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
            }
        };

        if self.angle.abs() < f64::EPSILON {
            return unrotated;
        }

        let rot = Affine::rotate_about(self.angle, unrotated.center());
        let corners = [
            Point::new(unrotated.x0, unrotated.y0),
            Point::new(unrotated.x1, unrotated.y0),
            Point::new(unrotated.x1, unrotated.y1),
            Point::new(unrotated.x0, unrotated.y1),
        ];
        let mut bounds = Rect::from_points(rot * corners[0], rot * corners[0]);
        for corner in &corners[1..] {
            bounds = bounds.union_pt(rot * *corner);
        }
        bounds
    }

    /// Reconciliation order: higher version wins, ties go to the higher nonce.
    pub fn supersedes(&self, other: &Element) -> bool {
        (self.version, self.version_nonce) > (other.version, other.version_nonce)
    }
}

/// Bounds of a relative point list anchored at `(x, y)`.
fn points_bounds(x: f64, y: f64, points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::new(x, y, x, y);
    };
    let mut rect = Rect::from_points(*first, *first);
    for p in &points[1..] {
        rect = rect.union_pt(*p);
    }
    rect + kurbo::Vec2::new(x, y)
}

/// Generate a render seed for new elements.
/// Counter mixed through splitmix32 so seeds differ without a time source.
fn generate_seed() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};

    static SEED_COUNTER: AtomicU32 = AtomicU32::new(1);

    let counter = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut x = counter.wrapping_mul(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EBCA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2AE35);
    x ^= x >> 16;
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_element_starts_at_version_one() {
        let rect = Element::rectangle(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.version(), 1);
        assert!(!rect.is_deleted);
        assert_eq!(rect.element_type(), ElementType::Rectangle);
    }

    #[test]
    fn test_seeds_differ() {
        let a = Element::rectangle(0.0, 0.0, 1.0, 1.0);
        let b = Element::rectangle(0.0, 0.0, 1.0, 1.0);
        assert_ne!(a.seed(), b.seed());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_center() {
        let block = Element::block(0.0, 0.0, 100.0, 50.0, BlockElement::default());
        assert_eq!(block.center(), Point::new(50.0, 25.0));
    }

    #[test]
    fn test_linear_bounds_use_points() {
        let connector = Element::connector(
            10.0,
            10.0,
            vec![Point::new(0.0, 0.0), Point::new(80.0, -20.0)],
        );
        let bounds = connector.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - -10.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 90.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rotated_bounds() {
        let mut rect = Element::rectangle(0.0, 0.0, 100.0, 50.0);
        rect.angle = std::f64::consts::FRAC_PI_2;
        let bounds = rect.bounds();
        assert!((bounds.width() - 50.0).abs() < 1e-9);
        assert!((bounds.height() - 100.0).abs() < 1e-9);
        assert!((bounds.center().x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_supersedes() {
        let a = Element::rectangle(0.0, 0.0, 1.0, 1.0);
        let mut b = a.clone();
        b.version = 2;
        assert!(b.supersedes(&a));
        assert!(!a.supersedes(&b));

        let mut c = a.clone();
        c.version_nonce = a.version_nonce.wrapping_add(1);
        assert_eq!(c.supersedes(&a), c.version_nonce > a.version_nonce);
    }

    #[test]
    fn test_anchors() {
        let block = ElementId::from("block-a");
        let mut connector = Element::connector(0.0, 0.0, vec![Point::ZERO, Point::new(10.0, 0.0)]);
        if let ElementKind::Connector(l) = &mut connector.kind {
            l.start_block_id = Some(block.clone());
            l.end_block_id = Some(block.clone());
        }
        assert_eq!(connector.anchors(), vec![block]);
    }

    #[test]
    fn test_freedraw_bounds_and_tag() {
        let stroke = FreeDrawElement::new(vec![Point::new(0.0, 0.0), Point::new(4.0, 9.0), Point::new(-2.0, 3.0)]);
        let element = Element::new(ElementKind::FreeDraw(stroke), 10.0, 10.0, 6.0, 9.0);
        assert_eq!(element.bounds(), Rect::new(8.0, 10.0, 14.0, 19.0));
        assert!(!element.is_bindable());

        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "freedraw");
        assert_eq!(json["simulatePressure"], true);
    }

    #[test]
    fn test_image_element() {
        let image = Element::new(ElementKind::Image(ImageElement::new(Some("file-1".into()))), 0.0, 0.0, 40.0, 30.0);
        assert!(image.is_bindable());
        assert!(!image.is_text_container());

        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["fileId"], "file-1");
    }

    #[test]
    fn test_serialized_type_tag() {
        let block = Element::block(0.0, 0.0, 100.0, 50.0, BlockElement::default());
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "block");
        assert_eq!(json["version"], 1);
        assert!(json.get("versionNonce").is_some());
        assert!(json.get("isDeleted").is_some());
    }
}
