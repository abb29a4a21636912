//! Linear elements: lines, arrows and connectors.

use super::ElementId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Arrowhead decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrowhead {
    Arrow,
    Bar,
    Dot,
    Triangle,
}

/// Which end of a linear element a binding applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorEnd {
    Start,
    End,
}

/// Binding of a linear element endpoint to a bindable element's outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointBinding {
    pub element_id: ElementId,
    /// Relative position along the outline (-1..1), kept for renderers.
    pub focus: f64,
    /// Distance kept between the endpoint and the outline.
    pub gap: f64,
}

impl PointBinding {
    pub fn new(element_id: ElementId, gap: f64) -> Self {
        Self {
            element_id,
            focus: 0.0,
            gap,
        }
    }
}

/// Point list and binding data shared by line, arrow and connector.
///
/// Points are relative to the owning element's `(x, y)` origin. The last
/// point is the movable terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearElement {
    pub points: Vec<Point>,
    pub last_committed_point: Option<Point>,
    pub start_binding: Option<PointBinding>,
    pub end_binding: Option<PointBinding>,
    pub start_arrowhead: Option<Arrowhead>,
    pub end_arrowhead: Option<Arrowhead>,
    /// Block the connector starts from (connectors only).
    pub start_block_id: Option<ElementId>,
    /// Block the connector ends at (connectors only).
    pub end_block_id: Option<ElementId>,
}

impl LinearElement {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            last_committed_point: None,
            start_binding: None,
            end_binding: None,
            start_arrowhead: None,
            end_arrowhead: None,
            start_block_id: None,
            end_block_id: None,
        }
    }

    pub fn with_end_arrowhead(mut self, arrowhead: Option<Arrowhead>) -> Self {
        self.end_arrowhead = arrowhead;
        self
    }

    /// The movable terminal point (last in the list).
    pub fn terminal(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Width and height spanned by the point list.
    pub fn size(&self) -> (f64, f64) {
        size_from_points(&self.points)
    }

    pub fn block_id(&self, end: ConnectorEnd) -> Option<&ElementId> {
        match end {
            ConnectorEnd::Start => self.start_block_id.as_ref(),
            ConnectorEnd::End => self.end_block_id.as_ref(),
        }
    }

    pub fn binding(&self, end: ConnectorEnd) -> Option<&PointBinding> {
        match end {
            ConnectorEnd::Start => self.start_binding.as_ref(),
            ConnectorEnd::End => self.end_binding.as_ref(),
        }
    }
}

/// Extent of a point list along each axis.
pub(crate) fn size_from_points(points: &[Point]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x, max_y - min_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_from_points() {
        let linear = LinearElement::new(vec![
            Point::new(0.0, 0.0),
            Point::new(-20.0, 40.0),
            Point::new(80.0, 10.0),
        ]);
        let (w, h) = linear.size();
        assert!((w - 100.0).abs() < f64::EPSILON);
        assert!((h - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_terminal_is_last_point() {
        let linear = LinearElement::new(vec![Point::ZERO, Point::new(5.0, 5.0), Point::new(9.0, 1.0)]);
        assert_eq!(linear.terminal(), Some(Point::new(9.0, 1.0)));
        assert_eq!(LinearElement::new(Vec::new()).terminal(), None);
    }
}
