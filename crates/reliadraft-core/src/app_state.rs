//! Editor session state consumed by actions and the drag path.

use crate::element::{Element, ElementId, GroupId};
use crate::scene::Scene;
use std::collections::HashSet;

/// Selection, group editing and diagram designations for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub selected_element_ids: HashSet<ElementId>,
    pub selected_group_ids: HashSet<GroupId>,
    /// Group currently entered for editing, if any.
    pub editing_group_id: Option<GroupId>,
    /// Block the reliability diagram starts from.
    pub start_block: Option<ElementId>,
    /// Block the reliability diagram ends at.
    pub end_block: Option<ElementId>,
    /// Transient notification for the UI to show.
    pub toast_message: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selected_element_ids.contains(id)
    }

    /// Add an element to the selection.
    pub fn select(&mut self, id: ElementId) {
        self.selected_element_ids.insert(id);
    }

    /// Add a whole group to the selection.
    pub fn select_group(&mut self, group_id: GroupId) {
        self.selected_group_ids.insert(group_id);
    }

    pub fn clear_selection(&mut self) {
        self.selected_element_ids.clear();
        self.selected_group_ids.clear();
    }

    /// Selected, non-deleted elements in z-order.
    pub fn selected_elements<'a>(&self, scene: &'a Scene) -> Vec<&'a Element> {
        scene
            .non_deleted_elements()
            .filter(|e| self.is_selected(e.id()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_elements_in_z_order() {
        let mut scene = Scene::new();
        let a = scene.insert(Element::rectangle(0.0, 0.0, 1.0, 1.0)).unwrap();
        let b = scene.insert(Element::rectangle(0.0, 0.0, 1.0, 1.0)).unwrap();
        let c = scene.insert(Element::rectangle(0.0, 0.0, 1.0, 1.0)).unwrap();
        scene.delete(&c);

        let mut state = AppState::new();
        state.select(b.clone());
        state.select(a.clone());
        state.select(c);

        let ids: Vec<_> = state.selected_elements(&scene).iter().map(|e| e.id().clone()).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
