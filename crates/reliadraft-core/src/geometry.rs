//! Pure geometry helpers for dragging, drawing and binding.
//!
//! Nothing here touches the scene; callers feed element snapshots in and
//! commit the results through the mutation gateway.

use crate::element::{Element, ElementType};
use kurbo::{Point, Rect, Vec2};

/// Default angle increment for locked linear drawing (15 degrees).
pub const SHIFT_LOCKING_ANGLE: f64 = std::f64::consts::PI / 12.0;

/// Union of the bounds of `elements`, or `None` for an empty set.
pub fn common_bounds<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Option<Rect> {
    elements
        .into_iter()
        .map(Element::bounds)
        .reduce(|acc, bounds| acc.union(bounds))
}

/// Offset from the top-left of the common bounds to the pointer.
pub fn drag_offset<'a>(
    elements: impl IntoIterator<Item = &'a Element>,
    pointer: Point,
) -> Option<Vec2> {
    let bounds = common_bounds(elements)?;
    Some(pointer - Point::new(bounds.x0, bounds.y0))
}

/// Cumulative pointer distance of a gesture, used to pick the locked axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragLock {
    pub distance_x: f64,
    pub distance_y: f64,
}

impl DragLock {
    pub fn new(distance_x: f64, distance_y: f64) -> Self {
        Self {
            distance_x,
            distance_y,
        }
    }

    /// Mostly vertical gesture: x stays at its original value.
    pub fn locks_x(&self) -> bool {
        self.distance_x < self.distance_y
    }

    /// Mostly horizontal gesture: y stays at its original value.
    pub fn locks_y(&self) -> bool {
        self.distance_x > self.distance_y
    }
}

/// New position for an element moved by `offset`.
///
/// With a lock, the pinned axis falls back to the gesture-start position in
/// `original`. Equal distances pin neither axis; a missing original pins
/// nothing either.
pub fn drag_position(current: Point, offset: Vec2, lock: Option<DragLock>, original: Option<Point>) -> Point {
    let moved = current + offset;
    match (lock, original) {
        (Some(lock), Some(original)) => Point::new(
            if lock.locks_x() { original.x } else { moved.x },
            if lock.locks_y() { original.y } else { moved.y },
        ),
        _ => moved,
    }
}

/// Snap a drawn size to the "perfect" shape for the element type.
///
/// Linear and freehand strokes snap their angle to multiples of
/// `locking_angle`; other shapes become square. Selection boxes are returned
/// unchanged. The sign of `height` is preserved; a zero height stays zero
/// for shapes.
pub fn perfect_element_size(element_type: ElementType, width: f64, height: f64, locking_angle: f64) -> (f64, f64) {
    let abs_width = width.abs();
    let abs_height = height.abs();
    let height_sign = if height < 0.0 { -1.0 } else { 1.0 };
    let shape_height_sign = if height == 0.0 { 0.0 } else { height_sign };

    match element_type {
        ElementType::Line | ElementType::Arrow | ElementType::Connector | ElementType::FreeDraw => {
            let angle = (abs_height.atan2(abs_width) / locking_angle).round() * locking_angle;
            if angle.abs() < 1e-9 {
                (width, 0.0)
            } else if (angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9 {
                (0.0, height)
            } else {
                (width, abs_width * angle.tan() * height_sign)
            }
        }
        ElementType::Selection => (width, height),
        ElementType::Rectangle
        | ElementType::Diamond
        | ElementType::Ellipse
        | ElementType::Text
        | ElementType::Image
        | ElementType::Block => (width, abs_width * shape_height_sign),
    }
}

/// Pointer state while an element is being drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewElementDrag {
    /// Where the pointer went down.
    pub origin: Point,
    /// Current pointer position.
    pub pointer: Point,
    /// Unsigned size of the drag.
    pub width: f64,
    pub height: f64,
    pub maintain_aspect_ratio: bool,
    pub resize_from_center: bool,
    /// Fixed width / height ratio used when the aspect ratio is maintained.
    pub aspect_ratio: Option<f64>,
}

impl NewElementDrag {
    /// Free drag from `origin` to `pointer` with no modifiers held.
    pub fn between(origin: Point, pointer: Point) -> Self {
        Self {
            origin,
            pointer,
            width: (pointer.x - origin.x).abs(),
            height: (pointer.y - origin.y).abs(),
            maintain_aspect_ratio: false,
            resize_from_center: false,
            aspect_ratio: None,
        }
    }

    pub fn maintain_aspect_ratio(mut self, aspect_ratio: Option<f64>) -> Self {
        self.maintain_aspect_ratio = true;
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn from_center(mut self) -> Self {
        self.resize_from_center = true;
        self
    }
}

/// Frame for an element being drawn, or `None` if it would have zero or
/// negative width or height.
pub fn new_element_frame(element_type: ElementType, drag: &NewElementDrag, locking_angle: f64) -> Option<Rect> {
    let NewElementDrag {
        origin, pointer, ..
    } = *drag;
    let mut width = drag.width;
    let mut height = drag.height;

    if drag.maintain_aspect_ratio {
        match drag.aspect_ratio.filter(|r| *r > 0.0 && r.is_finite()) {
            Some(ratio) => height = width / ratio,
            None => {
                let signed_height = if pointer.y < origin.y { -height } else { height };
                (width, height) = perfect_element_size(element_type, width, signed_height, locking_angle);
                height = height.abs();
            }
        }
    }

    let mut x = if pointer.x < origin.x { origin.x - width } else { origin.x };
    let mut y = if pointer.y < origin.y { origin.y - height } else { origin.y };

    if drag.resize_from_center {
        width += width;
        height += height;
        x = origin.x - width / 2.0;
        y = origin.y - height / 2.0;
    }

    if !(width > 0.0 && height > 0.0) {
        return None;
    }
    Some(Rect::new(x, y, x + width, y + height))
}

/// Point where the ray from the center of `rect` toward `toward` leaves it.
///
/// Returns the center when `toward` coincides with it.
pub fn ray_to_bounds(rect: Rect, toward: Point) -> Point {
    let center = rect.center();
    let direction = toward - center;
    let half = Vec2::new(rect.width() / 2.0, rect.height() / 2.0);

    let tx = if direction.x.abs() > f64::EPSILON {
        half.x / direction.x.abs()
    } else {
        f64::INFINITY
    };
    let ty = if direction.y.abs() > f64::EPSILON {
        half.y / direction.y.abs()
    } else {
        f64::INFINITY
    };
    let t = tx.min(ty);
    if !t.is_finite() {
        return center;
    }
    center + direction * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::BlockElement;

    #[test]
    fn test_common_bounds() {
        let a = Element::rectangle(0.0, 0.0, 10.0, 10.0);
        let b = Element::rectangle(20.0, -5.0, 10.0, 10.0);
        let bounds = common_bounds([&a, &b]).unwrap();
        assert_eq!(bounds, Rect::new(0.0, -5.0, 30.0, 10.0));
    }

    #[test]
    fn test_common_bounds_empty() {
        assert!(common_bounds(std::iter::empty::<&Element>()).is_none());
    }

    #[test]
    fn test_drag_offset() {
        let a = Element::block(10.0, 20.0, 100.0, 50.0, BlockElement::default());
        let offset = drag_offset([&a], Point::new(15.0, 40.0)).unwrap();
        assert!((offset.x - 5.0).abs() < f64::EPSILON);
        assert!((offset.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_position_lock() {
        let current = Point::new(10.0, 10.0);
        let offset = Vec2::new(5.0, 7.0);
        let original = Some(Point::new(0.0, 0.0));

        let free = drag_position(current, offset, None, original);
        assert_eq!(free, Point::new(15.0, 17.0));

        let horizontal = drag_position(current, offset, Some(DragLock::new(30.0, 4.0)), original);
        assert_eq!(horizontal, Point::new(15.0, 0.0));

        let vertical = drag_position(current, offset, Some(DragLock::new(4.0, 30.0)), original);
        assert_eq!(vertical, Point::new(0.0, 17.0));

        let tie = drag_position(current, offset, Some(DragLock::new(5.0, 5.0)), original);
        assert_eq!(tie, Point::new(15.0, 17.0));

        let no_original = drag_position(current, offset, Some(DragLock::new(30.0, 4.0)), None);
        assert_eq!(no_original, Point::new(15.0, 17.0));
    }

    #[test]
    fn test_perfect_size_square() {
        let (w, h) = perfect_element_size(ElementType::Rectangle, 40.0, -10.0, SHIFT_LOCKING_ANGLE);
        assert!((w - 40.0).abs() < f64::EPSILON);
        assert!((h + 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_perfect_size_selection_unchanged() {
        let (w, h) = perfect_element_size(ElementType::Selection, 40.0, 10.0, SHIFT_LOCKING_ANGLE);
        assert!((w - 40.0).abs() < f64::EPSILON);
        assert!((h - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_perfect_size_linear_snaps_angle() {
        // Shallow drag snaps flat.
        let (w, h) = perfect_element_size(ElementType::Connector, 100.0, 3.0, SHIFT_LOCKING_ANGLE);
        assert!((w - 100.0).abs() < f64::EPSILON);
        assert!(h.abs() < f64::EPSILON);

        // Steep drag snaps vertical.
        let (w, h) = perfect_element_size(ElementType::Line, 2.0, 100.0, SHIFT_LOCKING_ANGLE);
        assert!(w.abs() < f64::EPSILON);
        assert!((h - 100.0).abs() < f64::EPSILON);

        // Near-diagonal snaps to 45 degrees.
        let (w, h) = perfect_element_size(ElementType::Arrow, 100.0, 95.0, SHIFT_LOCKING_ANGLE);
        assert!((w - 100.0).abs() < f64::EPSILON);
        assert!((h - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_new_element_frame_normalizes_direction() {
        let drag = NewElementDrag::between(Point::new(100.0, 100.0), Point::new(60.0, 70.0));
        let frame = new_element_frame(ElementType::Block, &drag, SHIFT_LOCKING_ANGLE).unwrap();
        assert_eq!(frame, Rect::new(60.0, 70.0, 100.0, 100.0));
    }

    #[test]
    fn test_new_element_frame_aspect_ratio() {
        let drag = NewElementDrag::between(Point::ZERO, Point::new(100.0, 10.0)).maintain_aspect_ratio(Some(2.0));
        let frame = new_element_frame(ElementType::Image, &drag, SHIFT_LOCKING_ANGLE).unwrap();
        assert!((frame.width() - 100.0).abs() < f64::EPSILON);
        assert!((frame.height() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_element_frame_perfect_square_upward() {
        let drag = NewElementDrag::between(Point::new(0.0, 0.0), Point::new(40.0, -10.0)).maintain_aspect_ratio(None);
        let frame = new_element_frame(ElementType::Rectangle, &drag, SHIFT_LOCKING_ANGLE).unwrap();
        assert_eq!(frame, Rect::new(0.0, -40.0, 40.0, 0.0));
    }

    #[test]
    fn test_new_element_frame_from_center() {
        let drag = NewElementDrag::between(Point::new(50.0, 50.0), Point::new(60.0, 70.0)).from_center();
        let frame = new_element_frame(ElementType::Ellipse, &drag, SHIFT_LOCKING_ANGLE).unwrap();
        assert_eq!(frame, Rect::new(40.0, 30.0, 60.0, 70.0));
    }

    #[test]
    fn test_new_element_frame_degenerate() {
        let drag = NewElementDrag::between(Point::new(5.0, 5.0), Point::new(5.0, 50.0));
        assert!(new_element_frame(ElementType::Rectangle, &drag, SHIFT_LOCKING_ANGLE).is_none());
    }

    #[test]
    fn test_new_element_frame_negative_ratio_ignored() {
        // A non-positive ratio falls back to the perfect square.
        let drag = NewElementDrag::between(Point::ZERO, Point::new(100.0, 10.0)).maintain_aspect_ratio(Some(-2.0));
        let frame = new_element_frame(ElementType::Block, &drag, SHIFT_LOCKING_ANGLE).unwrap();
        assert!((frame.width() - 100.0).abs() < f64::EPSILON);
        assert!((frame.height() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_element_frame_negative_extents() {
        let mut drag = NewElementDrag::between(Point::ZERO, Point::new(30.0, 20.0));
        drag.height = -20.0;
        assert!(new_element_frame(ElementType::Rectangle, &drag, SHIFT_LOCKING_ANGLE).is_none());

        drag.height = 20.0;
        drag.width = -30.0;
        assert!(new_element_frame(ElementType::Rectangle, &drag, SHIFT_LOCKING_ANGLE).is_none());

        drag.width = f64::NAN;
        assert!(new_element_frame(ElementType::Rectangle, &drag, SHIFT_LOCKING_ANGLE).is_none());
    }

    #[test]
    fn test_perfect_square_keeps_zero_height() {
        let (w, h) = perfect_element_size(ElementType::Rectangle, 40.0, 0.0, SHIFT_LOCKING_ANGLE);
        assert!((w - 40.0).abs() < f64::EPSILON);
        assert!(h.abs() < f64::EPSILON);

        let flat = NewElementDrag::between(Point::ZERO, Point::new(40.0, 0.0)).maintain_aspect_ratio(None);
        assert!(new_element_frame(ElementType::Rectangle, &flat, SHIFT_LOCKING_ANGLE).is_none());
    }

    #[test]
    fn test_ray_to_bounds() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let right = ray_to_bounds(rect, Point::new(200.0, 25.0));
        assert!((right.x - 100.0).abs() < 1e-9);
        assert!((right.y - 25.0).abs() < 1e-9);
        let top = ray_to_bounds(rect, Point::new(50.0, -100.0));
        assert!((top.x - 50.0).abs() < 1e-9);
        assert!(top.y.abs() < 1e-9);
        assert_eq!(ray_to_bounds(rect, rect.center()), rect.center());
    }
}
