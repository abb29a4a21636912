//! Freehand strokes.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A freehand stroke with optional pen pressure per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeDrawElement {
    /// Points relative to the element origin.
    pub points: Vec<Point>,
    pub pressures: Vec<f64>,
    /// Synthesize pressure from stroke speed when the device reports none.
    pub simulate_pressure: bool,
    pub last_committed_point: Option<Point>,
}

impl FreeDrawElement {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            pressures: Vec::new(),
            simulate_pressure: true,
            last_committed_point: None,
        }
    }
}
