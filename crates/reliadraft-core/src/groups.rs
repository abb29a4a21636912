//! Group membership queries.
//!
//! `group_ids` on an element lists its groups deepest first, so the last
//! entry is the outermost group.

use crate::app_state::AppState;
use crate::element::{Element, GroupId};
use crate::scene::Scene;

/// Whether `element` belongs to `group_id`.
pub fn is_element_in_group(element: &Element, group_id: &GroupId) -> bool {
    element.group_ids.contains(group_id)
}

/// Live elements of `group_id`, in z-order.
pub fn elements_in_group<'a>(scene: &'a Scene, group_id: &GroupId) -> Vec<&'a Element> {
    scene
        .non_deleted_elements()
        .filter(|e| is_element_in_group(e, group_id))
        .collect()
}

/// The selected group through which `element` is selected, ignoring the
/// group currently being edited.
pub fn selected_group_for_element<'a>(app_state: &AppState, element: &'a Element) -> Option<&'a GroupId> {
    element
        .group_ids
        .iter()
        .filter(|g| app_state.editing_group_id.as_ref() != Some(*g))
        .find(|g| app_state.selected_group_ids.contains(*g))
}

/// Whether `element` is selected because one of its groups is.
pub fn is_selected_via_group(app_state: &AppState, element: &Element) -> bool {
    selected_group_for_element(app_state, element).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped(groups: &[&str]) -> Element {
        let mut rect = Element::rectangle(0.0, 0.0, 10.0, 10.0);
        rect.group_ids = groups.iter().map(|g| GroupId::from(*g)).collect();
        rect
    }

    #[test]
    fn test_selected_via_group() {
        let element = grouped(&["inner", "outer"]);
        let mut state = AppState::new();
        assert!(!is_selected_via_group(&state, &element));

        state.select_group(GroupId::from("outer"));
        assert!(is_selected_via_group(&state, &element));
        assert_eq!(
            selected_group_for_element(&state, &element),
            Some(&GroupId::from("outer"))
        );
    }

    #[test]
    fn test_editing_group_is_ignored() {
        let element = grouped(&["inner"]);
        let mut state = AppState::new();
        state.select_group(GroupId::from("inner"));
        state.editing_group_id = Some(GroupId::from("inner"));
        assert!(!is_selected_via_group(&state, &element));
    }

    #[test]
    fn test_elements_in_group() {
        let mut scene = Scene::new();
        let a = scene.insert(grouped(&["g"])).unwrap();
        scene.insert(grouped(&[])).unwrap();
        let members = elements_in_group(&scene, &GroupId::from("g"));
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id(), &a);
    }
}
