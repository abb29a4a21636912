//! Binding resolver.
//!
//! Recomputes the geometry of elements that depend on a moved element:
//! connectors tracking a block, and lines or arrows whose endpoints are bound
//! to a shape outline. All writes go through [`Scene::mutate`].

use crate::element::{ConnectorEnd, ElementId, PointBinding};
use crate::geometry::ray_to_bounds;
use crate::mutation::ElementUpdate;
use crate::scene::Scene;
use kurbo::Point;

/// Endpoints closer than this are considered unchanged.
const POINT_TOLERANCE: f64 = 1e-9;

/// Re-anchor every live connector bound to `block_id` on the block's center.
///
/// A connector starting at the block moves its origin to the center and
/// shifts its last point back so that the terminal stays put in scene
/// coordinates. A connector ending at the block moves its last point onto
/// the center. Returns the ids of the connectors that were updated.
pub fn update_block_connectors(scene: &mut Scene, block_id: &ElementId) -> Vec<ElementId> {
    let Some(block) = scene.get_live(block_id) else {
        log::debug!("block {} not in scene, no connectors to update", block_id);
        return Vec::new();
    };
    if !block.is_block() {
        return Vec::new();
    }
    let center = block.center();

    let mut updated = Vec::new();
    for connector_id in scene.connectors_of(block_id) {
        let Some(connector) = scene.get(&connector_id) else {
            continue;
        };
        let Some(linear) = connector.as_linear() else {
            continue;
        };
        let Some(last) = linear.terminal() else {
            log::debug!("connector {} has no points", connector_id);
            continue;
        };
        let origin = Point::new(connector.x, connector.y);
        let mut points = linear.points.clone();
        let last_index = points.len() - 1;

        let update = if linear.start_block_id.as_ref() == Some(block_id) {
            points[last_index] = last - (center - origin);
            ElementUpdate::new().position(center.x, center.y).points(points)
        } else if linear.end_block_id.as_ref() == Some(block_id) {
            points[last_index] = (center - origin).to_point();
            ElementUpdate::new().points(points)
        } else {
            continue;
        };

        scene.mutate(&connector_id, update);
        updated.push(connector_id);
    }
    updated
}

/// Re-project point-bound endpoints of lines and arrows onto `element_id`'s
/// outline, skipping dependents listed in `simultaneously_updated`.
///
/// Each endpoint lands where the ray from the element's center toward the
/// adjacent point crosses the bounds inflated by the binding gap. Only
/// dependents whose endpoints actually move are committed, so calling this
/// twice in a row changes nothing the second time.
pub fn update_bound_elements(scene: &mut Scene, element_id: &ElementId, simultaneously_updated: &[ElementId]) {
    let Some(element) = scene.get_live(element_id) else {
        log::debug!("bound element target {} not in scene", element_id);
        return;
    };
    if !element.is_bindable() {
        return;
    }
    let bounds = element.bounds();

    let dependents: Vec<ElementId> = scene
        .dependents_of(element_id)
        .filter(|id| !simultaneously_updated.contains(id))
        .cloned()
        .collect();

    for dependent_id in dependents {
        let Some(dependent) = scene.get_live(&dependent_id) else {
            continue;
        };
        let Some(linear) = dependent.as_linear() else {
            continue;
        };
        if linear.points.len() < 2 {
            continue;
        }
        let origin = Point::new(dependent.x, dependent.y);
        let mut points = linear.points.clone();
        let ends: Vec<(ConnectorEnd, PointBinding)> = [ConnectorEnd::Start, ConnectorEnd::End]
            .into_iter()
            .filter_map(|end| linear.binding(end).map(|b| (end, b.clone())))
            .filter(|(_, b)| &b.element_id == element_id)
            .collect();

        let mut changed = false;
        for (end, binding) in ends {
            let last_index = points.len() - 1;
            let (index, adjacent) = match end {
                ConnectorEnd::Start => (0, 1),
                ConnectorEnd::End => (last_index, last_index - 1),
            };
            let toward = origin + points[adjacent].to_vec2();
            let target = ray_to_bounds(bounds.inflate(binding.gap, binding.gap), toward);
            let relative = (target - origin).to_point();
            if (relative - points[index]).hypot() > POINT_TOLERANCE {
                points[index] = relative;
                changed = true;
            }
        }

        if changed {
            log::trace!("re-projected endpoints of {} onto {}", dependent_id, element_id);
            scene.mutate(&dependent_id, ElementUpdate::new().points(points));
        }
    }
}
