//! Editor actions on the reliability diagram.
//!
//! Actions take the scene and session state, write through the mutation
//! gateway, and return the next session state together with whether the
//! change belongs on the undo history.

use crate::app_state::AppState;
use crate::element::{BlockElement, Distribution, DistributionError, DistributionName};
use crate::mutation::ElementUpdate;
use crate::scene::Scene;

/// Outcome of an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub app_state: AppState,
    pub commit_to_history: bool,
}

/// Mark the first selected block as the diagram's start block.
pub fn set_as_start_block(scene: &Scene, app_state: &AppState) -> ActionResult {
    let mut next = app_state.clone();
    if let Some(block) = first_selected_block(scene, app_state) {
        log::info!("start block set to {}", block);
        next.start_block = Some(block);
        next.toast_message = Some("Assigned start block".to_string());
    }
    ActionResult {
        app_state: next,
        commit_to_history: false,
    }
}

/// Mark the first selected block as the diagram's end block.
pub fn set_as_end_block(scene: &Scene, app_state: &AppState) -> ActionResult {
    let mut next = app_state.clone();
    if let Some(block) = first_selected_block(scene, app_state) {
        log::info!("end block set to {}", block);
        next.end_block = Some(block);
        next.toast_message = Some("Assigned end block".to_string());
    }
    ActionResult {
        app_state: next,
        commit_to_history: false,
    }
}

fn first_selected_block(scene: &Scene, app_state: &AppState) -> Option<crate::element::ElementId> {
    app_state
        .selected_elements(scene)
        .into_iter()
        .find(|e| e.is_block())
        .map(|e| e.id().clone())
}

/// Which of a block's three distributions a form edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionSlot {
    Failure,
    CorrectiveMaintenance,
    PreventiveMaintenance,
}

/// Form state of the block property dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockProperties {
    pub attributes: BlockElement,
}

impl BlockProperties {
    pub fn from_block(block: &BlockElement) -> Self {
        Self {
            attributes: block.clone(),
        }
    }

    /// Prefill from the selection: the attributes of the selected block when
    /// exactly one element is selected and it is a block, defaults otherwise.
    pub fn from_selection(scene: &Scene, app_state: &AppState) -> Self {
        match app_state.selected_elements(scene).as_slice() {
            [only] => only.as_block().map(Self::from_block).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    pub fn distribution(&self, slot: DistributionSlot) -> &Distribution {
        match slot {
            DistributionSlot::Failure => &self.attributes.failure_distribution,
            DistributionSlot::CorrectiveMaintenance => &self.attributes.corrective_maintenance_distribution,
            DistributionSlot::PreventiveMaintenance => &self.attributes.preventive_maintenance_distribution,
        }
    }

    fn distribution_mut(&mut self, slot: DistributionSlot) -> &mut Distribution {
        match slot {
            DistributionSlot::Failure => &mut self.attributes.failure_distribution,
            DistributionSlot::CorrectiveMaintenance => &mut self.attributes.corrective_maintenance_distribution,
            DistributionSlot::PreventiveMaintenance => &mut self.attributes.preventive_maintenance_distribution,
        }
    }

    /// Switch a distribution; its parameters reset to the defaults.
    pub fn select_distribution(&mut self, slot: DistributionSlot, name: DistributionName) {
        self.distribution_mut(slot).set_name(name);
    }

    pub fn set_parameter(&mut self, slot: DistributionSlot, parameter: &str, value: f64) -> Result<(), DistributionError> {
        self.distribution_mut(slot).set_parameter(parameter, value)
    }
}

/// Write the form onto every selected block. Other selected elements are
/// left alone.
pub fn apply_block_properties(scene: &mut Scene, app_state: &AppState, properties: &BlockProperties) -> ActionResult {
    let blocks: Vec<_> = app_state
        .selected_elements(scene)
        .into_iter()
        .filter(|e| e.is_block())
        .map(|e| e.id().clone())
        .collect();

    for id in &blocks {
        scene.mutate(id, ElementUpdate::new().block(properties.attributes.clone()));
    }
    log::debug!("applied block properties to {} block(s)", blocks.len());

    ActionResult {
        app_state: app_state.clone(),
        commit_to_history: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn scene_with_blocks() -> (Scene, Vec<crate::element::ElementId>) {
        let mut scene = Scene::new();
        let rect = scene.insert(Element::rectangle(0.0, 0.0, 10.0, 10.0)).unwrap();
        let a = scene
            .insert(Element::block(0.0, 0.0, 100.0, 50.0, BlockElement::named("A")))
            .unwrap();
        let b = scene
            .insert(Element::block(200.0, 0.0, 100.0, 50.0, BlockElement::named("B")))
            .unwrap();
        (scene, vec![rect, a, b])
    }

    #[test]
    fn test_set_as_start_block() {
        let (scene, ids) = scene_with_blocks();
        let mut state = AppState::new();
        state.select(ids[0].clone());
        state.select(ids[2].clone());

        let result = set_as_start_block(&scene, &state);
        assert!(!result.commit_to_history);
        assert_eq!(result.app_state.start_block.as_ref(), Some(&ids[2]));
        assert_eq!(result.app_state.toast_message.as_deref(), Some("Assigned start block"));
    }

    #[test]
    fn test_set_as_end_block_without_block_is_noop() {
        let (scene, ids) = scene_with_blocks();
        let mut state = AppState::new();
        state.select(ids[0].clone());

        let result = set_as_end_block(&scene, &state);
        assert_eq!(result.app_state, state);
        assert!(!result.commit_to_history);
    }

    #[test]
    fn test_properties_from_selection() {
        let (scene, ids) = scene_with_blocks();
        let mut state = AppState::new();
        state.select(ids[1].clone());
        assert_eq!(BlockProperties::from_selection(&scene, &state).attributes.name, "A");

        state.select(ids[2].clone());
        assert_eq!(BlockProperties::from_selection(&scene, &state), BlockProperties::default());
    }

    #[test]
    fn test_apply_block_properties() {
        let (mut scene, ids) = scene_with_blocks();
        let mut state = AppState::new();
        for id in &ids {
            state.select(id.clone());
        }
        let rect_version = scene.get(&ids[0]).unwrap().version();

        let mut properties = BlockProperties::default();
        properties.attributes.name = "Pump".to_string();
        properties.select_distribution(DistributionSlot::Failure, DistributionName::Exponential1P);
        properties
            .set_parameter(DistributionSlot::Failure, "lambda", 0.5)
            .unwrap();

        let result = apply_block_properties(&mut scene, &state, &properties);
        assert!(result.commit_to_history);

        for id in &ids[1..] {
            let block = scene.get(id).unwrap().as_block().unwrap();
            assert_eq!(block.name, "Pump");
            assert_eq!(block.failure_distribution.parameter("lambda"), Some(0.5));
        }
        assert_eq!(scene.get(&ids[0]).unwrap().version(), rect_version);
    }

    #[test]
    fn test_form_rejects_foreign_parameter() {
        let mut properties = BlockProperties::default();
        assert!(
            properties
                .set_parameter(DistributionSlot::CorrectiveMaintenance, "beta", 2.0)
                .is_err()
        );
        assert_eq!(
            properties.distribution(DistributionSlot::CorrectiveMaintenance).name(),
            DistributionName::Normal
        );
    }
}
