//! Mutation gateway.
//!
//! [`mutate_element`] is the only way to derive a changed element from an
//! existing one. Each call produces a new value with `version + 1`, a fresh
//! random `version_nonce` and the current timestamp. [`ElementUpdate`] has no
//! way to express `id`, `seed` or `version`.
//!
//! Binding fields (`bound_elements`, point bindings, block ids, container id)
//! are settable only from inside the crate so that [`crate::scene::Scene`]
//! can keep both halves of every relationship in step.

use crate::element::{
    BlockElement, BoundElement, Element, ElementId, ElementKind, ElementStyle, GroupId,
    PointBinding, size_from_points,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

/// Partial set of element fields to merge into an element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementUpdate {
    pub(crate) x: Option<f64>,
    pub(crate) y: Option<f64>,
    pub(crate) width: Option<f64>,
    pub(crate) height: Option<f64>,
    pub(crate) angle: Option<f64>,
    pub(crate) style: Option<ElementStyle>,
    pub(crate) is_deleted: Option<bool>,
    pub(crate) group_ids: Option<Vec<GroupId>>,
    pub(crate) points: Option<Vec<Point>>,
    pub(crate) text: Option<String>,
    pub(crate) block: Option<BlockElement>,
    pub(crate) start_binding: Option<Option<PointBinding>>,
    pub(crate) end_binding: Option<Option<PointBinding>>,
    pub(crate) start_block_id: Option<Option<ElementId>>,
    pub(crate) end_block_id: Option<Option<ElementId>>,
    pub(crate) container_id: Option<Option<ElementId>>,
    pub(crate) bound_elements: Option<Vec<BoundElement>>,
}

impl ElementUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn position(self, x: f64, y: f64) -> Self {
        self.x(x).y(y)
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn style(mut self, style: ElementStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn deleted(mut self, is_deleted: bool) -> Self {
        self.is_deleted = Some(is_deleted);
        self
    }

    pub fn group_ids(mut self, group_ids: Vec<GroupId>) -> Self {
        self.group_ids = Some(group_ids);
        self
    }

    /// Replace the point list (linear and freedraw elements). Width and
    /// height follow the new points.
    pub fn points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Replace the reliability attributes of a block.
    pub fn block(mut self, block: BlockElement) -> Self {
        self.block = Some(block);
        self
    }

    pub(crate) fn start_binding(mut self, binding: Option<PointBinding>) -> Self {
        self.start_binding = Some(binding);
        self
    }

    pub(crate) fn end_binding(mut self, binding: Option<PointBinding>) -> Self {
        self.end_binding = Some(binding);
        self
    }

    pub(crate) fn start_block_id(mut self, id: Option<ElementId>) -> Self {
        self.start_block_id = Some(id);
        self
    }

    pub(crate) fn end_block_id(mut self, id: Option<ElementId>) -> Self {
        self.end_block_id = Some(id);
        self
    }

    pub(crate) fn container_id(mut self, id: Option<ElementId>) -> Self {
        self.container_id = Some(id);
        self
    }

    pub(crate) fn bound_elements(mut self, bound: Vec<BoundElement>) -> Self {
        self.bound_elements = Some(bound);
        self
    }

    /// Whether the update would change binding relationships.
    pub(crate) fn touches_bindings(&self) -> bool {
        self.start_binding.is_some()
            || self.end_binding.is_some()
            || self.start_block_id.is_some()
            || self.end_block_id.is_some()
            || self.container_id.is_some()
    }
}

/// Record of a committed mutation, for history and collaboration observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRecord {
    pub id: ElementId,
    pub version: u32,
    pub version_nonce: u32,
}

impl MutationRecord {
    pub fn of(element: &Element) -> Self {
        Self {
            id: element.id().clone(),
            version: element.version(),
            version_nonce: element.version_nonce(),
        }
    }
}

/// Apply `update` to a copy of `element` and stamp a new version.
///
/// No other element is touched. Fields that do not apply to the element's
/// variant (points on a rectangle, block data on a text) are ignored.
pub fn mutate_element(element: &Element, update: ElementUpdate) -> Element {
    let mut next = element.clone();
    let element_type = next.element_type();

    if let Some(x) = update.x {
        next.x = x;
    }
    if let Some(y) = update.y {
        next.y = y;
    }
    if let Some(width) = update.width {
        next.width = width;
    }
    if let Some(height) = update.height {
        next.height = height;
    }
    if let Some(angle) = update.angle {
        next.angle = angle;
    }
    if let Some(style) = update.style {
        next.style = style;
    }
    if let Some(is_deleted) = update.is_deleted {
        next.is_deleted = is_deleted;
    }
    if let Some(group_ids) = update.group_ids {
        next.group_ids = group_ids;
    }
    if let Some(bound) = update.bound_elements {
        next.bound_elements = bound;
    }

    match &mut next.kind {
        ElementKind::Line(linear) | ElementKind::Arrow(linear) | ElementKind::Connector(linear) => {
            if let Some(points) = update.points {
                let (width, height) = size_from_points(&points);
                linear.points = points;
                next.width = width;
                next.height = height;
            }
            if let Some(binding) = update.start_binding {
                linear.start_binding = binding;
            }
            if let Some(binding) = update.end_binding {
                linear.end_binding = binding;
            }
            if let Some(id) = update.start_block_id {
                linear.start_block_id = id;
            }
            if let Some(id) = update.end_block_id {
                linear.end_block_id = id;
            }
        }
        ElementKind::FreeDraw(freedraw) => {
            if let Some(points) = update.points {
                let (width, height) = size_from_points(&points);
                freedraw.points = points;
                next.width = width;
                next.height = height;
            }
        }
        ElementKind::Text(text) => {
            if let Some(content) = update.text {
                text.text = content;
            }
            if let Some(id) = update.container_id {
                text.container_id = id;
            }
        }
        ElementKind::Block(block) => {
            if let Some(attributes) = update.block {
                *block = attributes;
            }
        }
        ElementKind::Selection
        | ElementKind::Rectangle
        | ElementKind::Diamond
        | ElementKind::Ellipse
        | ElementKind::Image(_) => {
            if update.points.is_some() || update.text.is_some() || update.block.is_some() {
                log::debug!(
                    "ignoring variant fields for {:?} element {}",
                    element_type,
                    element.id()
                );
            }
        }
    }

    bump_version(&mut next);
    next
}

/// Stamp a new version, nonce and timestamp. The nonce never repeats the
/// previous one. The version saturates at `u32::MAX` instead of wrapping.
pub(crate) fn bump_version(element: &mut Element) {
    element.version = element.version.saturating_add(1);
    let previous = element.version_nonce;
    element.version_nonce = loop {
        let nonce = random_nonce();
        if nonce != previous {
            break nonce;
        }
    };
    element.updated = now_millis();
}

/// Fresh random 32-bit nonce.
pub(crate) fn random_nonce() -> u32 {
    rand::random::<u32>()
}

/// Current time in epoch milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{BlockElement, DistributionName};

    #[test]
    fn test_mutate_increments_version() {
        let rect = Element::rectangle(0.0, 0.0, 10.0, 10.0);
        let moved = mutate_element(&rect, ElementUpdate::new().position(5.0, 6.0));
        assert_eq!(moved.version(), rect.version() + 1);
        assert!((moved.x - 5.0).abs() < f64::EPSILON);
        assert!((moved.y - 6.0).abs() < f64::EPSILON);
        assert_eq!(moved.id(), rect.id());
        assert_eq!(moved.seed(), rect.seed());
        assert!(moved.updated() >= rect.updated());
    }

    #[test]
    fn test_version_saturates() {
        let mut rect = Element::rectangle(0.0, 0.0, 10.0, 10.0);
        rect.version = u32::MAX;
        let next = mutate_element(&rect, ElementUpdate::new().x(1.0));
        assert_eq!(next.version(), u32::MAX);
        assert_ne!(next.version_nonce(), rect.version_nonce());
    }

    #[test]
    fn test_original_untouched() {
        let rect = Element::rectangle(0.0, 0.0, 10.0, 10.0);
        let _ = mutate_element(&rect, ElementUpdate::new().x(99.0));
        assert!((rect.x - 0.0).abs() < f64::EPSILON);
        assert_eq!(rect.version(), 1);
    }

    #[test]
    fn test_empty_update_still_bumps() {
        let rect = Element::rectangle(0.0, 0.0, 10.0, 10.0);
        let same = mutate_element(&rect, ElementUpdate::new());
        assert_eq!(same.version(), 2);
    }

    #[test]
    fn test_points_update_resizes() {
        let connector = Element::connector(0.0, 0.0, vec![Point::ZERO, Point::new(10.0, 0.0)]);
        let next = mutate_element(
            &connector,
            ElementUpdate::new().points(vec![Point::ZERO, Point::new(30.0, -40.0)]),
        );
        assert!((next.width - 30.0).abs() < f64::EPSILON);
        assert!((next.height - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_points_ignored_on_rectangle() {
        let rect = Element::rectangle(0.0, 0.0, 10.0, 20.0);
        let next = mutate_element(&rect, ElementUpdate::new().points(vec![Point::ZERO]));
        assert!((next.width - 10.0).abs() < f64::EPSILON);
        assert!((next.height - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_block_attributes_replaced() {
        let block = Element::block(0.0, 0.0, 100.0, 50.0, BlockElement::default());
        let mut attributes = BlockElement::named("Compressor");
        attributes.failure_distribution.set_name(DistributionName::Weibull3P);
        let next = mutate_element(&block, ElementUpdate::new().block(attributes));
        let data = next.as_block().unwrap();
        assert_eq!(data.name, "Compressor");
        assert_eq!(data.failure_distribution.parameters().len(), 3);
    }

    #[test]
    fn test_record_matches_element() {
        let rect = Element::rectangle(0.0, 0.0, 1.0, 1.0);
        let next = mutate_element(&rect, ElementUpdate::new().deleted(true));
        let record = MutationRecord::of(&next);
        assert_eq!(record.version, 2);
        assert_eq!(record.version_nonce, next.version_nonce());
        assert!(next.is_deleted);
    }
}
