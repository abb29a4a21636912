//! Drag orchestration.
//!
//! Called once per pointer-move frame. Moves the selection by a common
//! offset, then lets the binding resolver bring connectors, bound text and
//! point-bound arrows along.

use crate::app_state::AppState;
use crate::binding::{update_block_connectors, update_bound_elements};
use crate::config::EditorConfig;
use crate::element::{Element, ElementId};
use crate::geometry::{DragLock, NewElementDrag, drag_offset, drag_position, new_element_frame};
use crate::groups::is_selected_via_group;
use crate::mutation::ElementUpdate;
use crate::scene::Scene;
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// Snapshot taken when the pointer goes down on a selection.
#[derive(Debug, Clone, Default)]
pub struct PointerDownState {
    /// Pointer position at gesture start.
    pub origin: Point,
    /// Selected elements (and their bound text) as they were at gesture start.
    original_elements: HashMap<ElementId, Element>,
}

impl PointerDownState {
    /// Capture the selected elements and the text bound to them.
    pub fn capture(scene: &Scene, selected: &[ElementId], origin: Point) -> Self {
        let mut original_elements = HashMap::new();
        for id in selected {
            let Some(element) = scene.get_live(id) else {
                continue;
            };
            original_elements.insert(id.clone(), element.clone());
            if let Some(text_id) = scene.bound_text_of(id) {
                if let Some(text) = scene.get(&text_id) {
                    original_elements.insert(text_id, text.clone());
                }
            }
        }
        Self {
            origin,
            original_elements,
        }
    }

    /// The element as it was when the gesture started.
    pub fn original(&self, id: &ElementId) -> Option<&Element> {
        self.original_elements.get(id)
    }

    pub fn originals(&self) -> impl Iterator<Item = &Element> {
        self.original_elements.values()
    }

    /// Pointer travel since gesture start.
    pub fn distance(&self, pointer: Point) -> DragLock {
        DragLock::new((pointer.x - self.origin.x).abs(), (pointer.y - self.origin.y).abs())
    }
}

/// Move the selection so its common top-left lands on `pointer`.
///
/// Connectors in the selection are not moved directly; they follow their
/// blocks. A container's bound text moves with it only when the container is
/// dragged on its own rather than as part of a selected group, and never
/// when the text is itself selected. Returns the ids of the elements moved
/// directly.
pub fn drag_selected_elements(
    scene: &mut Scene,
    app_state: &AppState,
    pointer_down_state: &PointerDownState,
    selected: &[ElementId],
    pointer: Point,
    lock: Option<DragLock>,
) -> Vec<ElementId> {
    let selected: Vec<ElementId> = selected
        .iter()
        .filter(|id| scene.get_live(id).is_some())
        .cloned()
        .collect();
    let Some(offset) = drag_offset(selected.iter().filter_map(|id| scene.get(id)), pointer) else {
        return Vec::new();
    };
    log::trace!("drag frame: offset ({}, {}), lock {:?}", offset.x, offset.y, lock);

    let mut moved = Vec::new();
    for id in &selected {
        let Some(element) = scene.get_live(id) else {
            continue;
        };
        if element.is_connector() {
            continue;
        }
        let is_block = element.is_block();
        let drags_bound_text = element.group_ids.is_empty()
            || (app_state.editing_group_id.is_some() && !is_selected_via_group(app_state, element));

        move_element(scene, pointer_down_state, id, offset, lock);
        moved.push(id.clone());

        if is_block {
            update_block_connectors(scene, id);
        }

        if drags_bound_text {
            match scene.bound_text_of(id) {
                Some(text_id) if !selected.contains(&text_id) => {
                    move_element(scene, pointer_down_state, &text_id, offset, lock);
                }
                _ => {}
            }
        }

        update_bound_elements(scene, id, &selected);
    }
    moved
}

fn move_element(
    scene: &mut Scene,
    pointer_down_state: &PointerDownState,
    id: &ElementId,
    offset: Vec2,
    lock: Option<DragLock>,
) {
    let Some(element) = scene.get(id) else {
        log::debug!("drag target {} not in scene", id);
        return;
    };
    let original = pointer_down_state.original(id).map(|e| Point::new(e.x, e.y));
    let position = drag_position(Point::new(element.x, element.y), offset, lock, original);
    scene.mutate(id, ElementUpdate::new().position(position.x, position.y));
}

/// Resize the element being drawn to follow the pointer.
///
/// Returns false, leaving the element untouched, when it does not resolve or
/// the drag would give it zero width or height.
pub fn drag_new_element(scene: &mut Scene, id: &ElementId, drag: &NewElementDrag, config: &EditorConfig) -> bool {
    let Some(element) = scene.get_live(id) else {
        log::debug!("new element {} not in scene", id);
        return false;
    };
    let Some(frame) = new_element_frame(element.element_type(), drag, config.shift_locking_angle) else {
        return false;
    };
    scene.mutate(
        id,
        ElementUpdate::new()
            .position(frame.x0, frame.y0)
            .size(frame.width(), frame.height()),
    );
    true
}
