//! Element store for one document session.
//!
//! The [`Scene`] owns every element, including soft-deleted tombstones. Each
//! binding is recorded twice: forward on the dependent (a connector's block
//! ids, a text's container id, an arrow's point bindings) and backward in the
//! anchor's `bound_elements`. The forward half is authoritative; the scene
//! keeps the backward half and an anchor → dependents index in step with it.

use crate::element::{
    BoundElement, BoundElementKind, ConnectorEnd, Element, ElementId, ElementKind, PointBinding,
};
use crate::mutation::{ElementUpdate, MutationRecord, mutate_element};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Errors from explicit scene operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("element already exists: {0}")]
    DuplicateId(ElementId),
    #[error("element not found: {0}")]
    NotFound(ElementId),
    #[error("element {0} is deleted")]
    Deleted(ElementId),
    #[error("element {0} is not a connector")]
    NotConnector(ElementId),
    #[error("element {0} is not a block")]
    NotBlock(ElementId),
    #[error("element {0} is not a text element")]
    NotText(ElementId),
    #[error("element {0} cannot contain text")]
    NotContainer(ElementId),
    #[error("element {0} is not a line or arrow")]
    NotLinear(ElementId),
    #[error("element {0} cannot be bound to")]
    NotBindable(ElementId),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// A divergence between the two halves of a binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("{dependent} references {anchor} but {anchor} does not list it")]
    MissingBackReference {
        anchor: ElementId,
        dependent: ElementId,
    },
    #[error("{anchor} lists {dependent} but {dependent} does not reference it")]
    DanglingBackReference {
        anchor: ElementId,
        dependent: ElementId,
    },
    #[error("dependents index for {anchor} is out of sync")]
    IndexOutOfSync { anchor: ElementId },
}

/// The authoritative element collection.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// All elements keyed by id, tombstones included.
    elements: HashMap<ElementId, Element>,
    /// Z-order (back to front).
    z_order: Vec<ElementId>,
    /// Anchor id → ids of elements referencing it.
    dependents: HashMap<ElementId, BTreeSet<ElementId>>,
    /// Mutations committed since the last drain.
    mutations: Vec<MutationRecord>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a newly created element on top of the z-order.
    ///
    /// Forward references carried by the element are indexed, and anchors
    /// already in the scene receive the matching back-reference. Incoming
    /// back-references are rebuilt from the dependents' forward references:
    /// entries naming an element that is absent or does not reference this
    /// one are dropped.
    pub fn insert(&mut self, mut element: Element) -> SceneResult<ElementId> {
        let id = element.id().clone();
        if self.elements.contains_key(&id) {
            return Err(SceneError::DuplicateId(id));
        }

        let carried = element.bound_elements.len();
        element.bound_elements.retain(|bound| {
            self.get(&bound.id)
                .is_some_and(|dependent| dependent.anchors().contains(&id))
        });
        if element.bound_elements.len() != carried {
            log::debug!(
                "dropped {} unbacked back-reference(s) from {}",
                carried - element.bound_elements.len(),
                id
            );
        }

        let anchors = element.anchors();
        let back_kind = back_reference_kind(&element);
        self.elements.insert(id.clone(), element);
        self.z_order.push(id.clone());

        for anchor in anchors {
            self.dependents
                .entry(anchor.clone())
                .or_default()
                .insert(id.clone());
            if let Some(kind) = back_kind {
                self.add_back_reference(&anchor, &id, kind);
            }
        }

        // Dependents inserted before this anchor.
        let waiting: Vec<ElementId> = self.dependents_of(&id).cloned().collect();
        for dependent in waiting {
            if let Some(kind) = self.get(&dependent).and_then(back_reference_kind) {
                self.add_back_reference(&id, &dependent, kind);
            }
        }
        Ok(id)
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Look up an element that has not been soft-deleted.
    pub fn get_live(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id).filter(|e| !e.is_deleted)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Number of elements, tombstones included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in z-order (back to front), tombstones included.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.z_order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Elements in z-order that have not been soft-deleted.
    pub fn non_deleted_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements().filter(|e| !e.is_deleted)
    }

    /// Commit `update` to the element with `id` through the mutation gateway.
    ///
    /// Returns `None` (and changes nothing) when the id does not resolve.
    pub fn mutate(&mut self, id: &ElementId, update: ElementUpdate) -> Option<&Element> {
        let Some(current) = self.elements.get(id) else {
            log::debug!("mutate: element {} not in scene", id);
            return None;
        };

        let touches_bindings = update.touches_bindings();
        let old_anchors = if touches_bindings {
            current.anchors()
        } else {
            Vec::new()
        };
        let next = mutate_element(current, update);
        if touches_bindings {
            let new_anchors = next.anchors();
            self.reindex(id, &old_anchors, &new_anchors);
        }

        self.mutations.push(MutationRecord::of(&next));
        self.elements.insert(id.clone(), next);
        self.elements.get(id)
    }

    /// Soft-delete an element. Returns false if the id does not resolve.
    pub fn delete(&mut self, id: &ElementId) -> bool {
        self.mutate(id, ElementUpdate::new().deleted(true)).is_some()
    }

    /// Take the mutation records committed since the last call.
    pub fn drain_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    /// Ids of elements referencing `anchor`.
    pub fn dependents_of(&self, anchor: &ElementId) -> impl Iterator<Item = &ElementId> {
        self.dependents.get(anchor).into_iter().flatten()
    }

    /// Live connectors whose start or end block is `block_id`.
    pub fn connectors_of(&self, block_id: &ElementId) -> Vec<ElementId> {
        self.dependents_of(block_id)
            .filter_map(|id| self.get_live(id))
            .filter(|e| match &e.kind {
                ElementKind::Connector(l) => {
                    l.start_block_id.as_ref() == Some(block_id)
                        || l.end_block_id.as_ref() == Some(block_id)
                }
                _ => false,
            })
            .map(|e| e.id().clone())
            .collect()
    }

    /// The live text element bound to `container_id`, if it resolves.
    pub fn bound_text_of(&self, container_id: &ElementId) -> Option<ElementId> {
        let text_id = self.get(container_id)?.bound_text_id()?;
        match self.get_live(text_id) {
            Some(text) if text.as_text().is_some() => Some(text_id.clone()),
            _ => {
                log::debug!("bound text {} of {} does not resolve", text_id, container_id);
                None
            }
        }
    }

    /// Attach one end of a connector to a block.
    ///
    /// A block previously attached at that end loses its back-reference
    /// unless the connector still references it from the other end.
    pub fn bind_connector(
        &mut self,
        connector_id: &ElementId,
        end: ConnectorEnd,
        block_id: &ElementId,
    ) -> SceneResult<()> {
        let connector = self.require_live(connector_id)?;
        let ElementKind::Connector(linear) = &connector.kind else {
            return Err(SceneError::NotConnector(connector_id.clone()));
        };
        let previous = linear.block_id(end).cloned();
        if !self.require_live(block_id)?.is_block() {
            return Err(SceneError::NotBlock(block_id.clone()));
        }
        if previous.as_ref() == Some(block_id) {
            return Ok(());
        }

        let update = match end {
            ConnectorEnd::Start => ElementUpdate::new().start_block_id(Some(block_id.clone())),
            ConnectorEnd::End => ElementUpdate::new().end_block_id(Some(block_id.clone())),
        };
        self.mutate(connector_id, update);
        if let Some(previous) = previous {
            self.prune_back_reference(&previous, connector_id);
        }
        self.add_back_reference(block_id, connector_id, BoundElementKind::Connector);
        log::debug!("bound connector {} {:?} to block {}", connector_id, end, block_id);
        Ok(())
    }

    /// Detach one end of a connector from its block.
    pub fn unbind_connector(&mut self, connector_id: &ElementId, end: ConnectorEnd) -> SceneResult<()> {
        let connector = self.require(connector_id)?;
        let ElementKind::Connector(linear) = &connector.kind else {
            return Err(SceneError::NotConnector(connector_id.clone()));
        };
        let Some(previous) = linear.block_id(end).cloned() else {
            return Ok(());
        };

        let update = match end {
            ConnectorEnd::Start => ElementUpdate::new().start_block_id(None),
            ConnectorEnd::End => ElementUpdate::new().end_block_id(None),
        };
        self.mutate(connector_id, update);
        self.prune_back_reference(&previous, connector_id);
        Ok(())
    }

    /// Make `text_id` the label of `container_id`.
    ///
    /// The relationship is one-to-one: a label already on the container is
    /// released, and the text leaves any previous container.
    pub fn bind_text(&mut self, text_id: &ElementId, container_id: &ElementId) -> SceneResult<()> {
        let text = self.require_live(text_id)?;
        let Some(text_data) = text.as_text() else {
            return Err(SceneError::NotText(text_id.clone()));
        };
        let previous_container = text_data.container_id.clone();
        let container = self.require_live(container_id)?;
        if !container.is_text_container() {
            return Err(SceneError::NotContainer(container_id.clone()));
        }
        if previous_container.as_ref() == Some(container_id) {
            return Ok(());
        }
        let displaced = container.bound_text_id().filter(|id| *id != text_id).cloned();

        if let Some(displaced) = displaced {
            self.mutate(&displaced, ElementUpdate::new().container_id(None));
            self.prune_back_reference(container_id, &displaced);
        }
        self.mutate(text_id, ElementUpdate::new().container_id(Some(container_id.clone())));
        if let Some(previous) = previous_container {
            self.prune_back_reference(&previous, text_id);
        }
        self.add_back_reference(container_id, text_id, BoundElementKind::Text);
        Ok(())
    }

    /// Bind an endpoint of a line or arrow to a bindable element's outline.
    pub fn bind_point(
        &mut self,
        linear_id: &ElementId,
        end: ConnectorEnd,
        target_id: &ElementId,
        gap: f64,
    ) -> SceneResult<()> {
        let linear = self.require_live(linear_id)?;
        let previous = match &linear.kind {
            ElementKind::Line(l) | ElementKind::Arrow(l) => l.binding(end).map(|b| b.element_id.clone()),
            _ => return Err(SceneError::NotLinear(linear_id.clone())),
        };
        if !self.require_live(target_id)?.is_bindable() {
            return Err(SceneError::NotBindable(target_id.clone()));
        }

        let binding = Some(PointBinding::new(target_id.clone(), gap));
        let update = match end {
            ConnectorEnd::Start => ElementUpdate::new().start_binding(binding),
            ConnectorEnd::End => ElementUpdate::new().end_binding(binding),
        };
        self.mutate(linear_id, update);
        if let Some(previous) = previous.filter(|p| p != target_id) {
            self.prune_back_reference(&previous, linear_id);
        }
        self.add_back_reference(target_id, linear_id, BoundElementKind::Arrow);
        Ok(())
    }

    /// Verify that both halves of every binding agree and that the
    /// dependents index matches the forward references.
    pub fn check_bindings(&self) -> Result<(), BindingError> {
        let mut derived: HashMap<&ElementId, BTreeSet<&ElementId>> = HashMap::new();

        for element in self.elements() {
            for anchor_id in element.anchors() {
                if let Some(anchor) = self.get(&anchor_id) {
                    if !anchor.bound_elements.iter().any(|b| &b.id == element.id()) {
                        return Err(BindingError::MissingBackReference {
                            anchor: anchor_id,
                            dependent: element.id().clone(),
                        });
                    }
                    derived.entry(anchor.id()).or_default().insert(element.id());
                }
            }
            for bound in &element.bound_elements {
                if let Some(dependent) = self.get(&bound.id) {
                    if !dependent.anchors().contains(element.id()) {
                        return Err(BindingError::DanglingBackReference {
                            anchor: element.id().clone(),
                            dependent: bound.id.clone(),
                        });
                    }
                }
            }
        }

        for (anchor, expected) in &derived {
            let indexed: BTreeSet<&ElementId> = self.dependents_of(anchor).collect();
            if &indexed != expected {
                return Err(BindingError::IndexOutOfSync {
                    anchor: (*anchor).clone(),
                });
            }
        }
        Ok(())
    }

    fn require(&self, id: &ElementId) -> SceneResult<&Element> {
        self.get(id).ok_or_else(|| SceneError::NotFound(id.clone()))
    }

    fn require_live(&self, id: &ElementId) -> SceneResult<&Element> {
        let element = self.require(id)?;
        if element.is_deleted {
            return Err(SceneError::Deleted(id.clone()));
        }
        Ok(element)
    }

    fn reindex(&mut self, id: &ElementId, old_anchors: &[ElementId], new_anchors: &[ElementId]) {
        for anchor in old_anchors.iter().filter(|a| !new_anchors.contains(a)) {
            if let Some(set) = self.dependents.get_mut(anchor) {
                set.remove(id);
                if set.is_empty() {
                    self.dependents.remove(anchor);
                }
            }
        }
        for anchor in new_anchors.iter().filter(|a| !old_anchors.contains(a)) {
            self.dependents
                .entry(anchor.clone())
                .or_default()
                .insert(id.clone());
        }
    }

    fn add_back_reference(&mut self, anchor: &ElementId, dependent: &ElementId, kind: BoundElementKind) {
        let Some(anchor_element) = self.get(anchor) else {
            log::debug!("anchor {} of {} not in scene", anchor, dependent);
            return;
        };
        if anchor_element.bound_elements.iter().any(|b| &b.id == dependent) {
            return;
        }
        let mut bound = anchor_element.bound_elements.clone();
        bound.push(BoundElement {
            id: dependent.clone(),
            kind,
        });
        self.mutate(anchor, ElementUpdate::new().bound_elements(bound));
    }

    /// Remove `dependent` from `anchor`'s back-references if the dependent
    /// no longer references the anchor at all.
    fn prune_back_reference(&mut self, anchor: &ElementId, dependent: &ElementId) {
        let still_referenced = self
            .get(dependent)
            .is_some_and(|d| d.anchors().contains(anchor));
        if still_referenced {
            return;
        }
        let Some(anchor_element) = self.get(anchor) else {
            return;
        };
        if !anchor_element.bound_elements.iter().any(|b| &b.id == dependent) {
            return;
        }
        let bound: Vec<BoundElement> = anchor_element
            .bound_elements
            .iter()
            .filter(|b| &b.id != dependent)
            .cloned()
            .collect();
        self.mutate(anchor, ElementUpdate::new().bound_elements(bound));
    }
}

/// Kind of back-reference an anchor stores for `dependent`.
fn back_reference_kind(dependent: &Element) -> Option<BoundElementKind> {
    match dependent.kind {
        ElementKind::Connector(_) => Some(BoundElementKind::Connector),
        ElementKind::Line(_) | ElementKind::Arrow(_) => Some(BoundElementKind::Arrow),
        ElementKind::Text(_) => Some(BoundElementKind::Text),
        ElementKind::Selection
        | ElementKind::Rectangle
        | ElementKind::Diamond
        | ElementKind::Ellipse
        | ElementKind::FreeDraw(_)
        | ElementKind::Image(_)
        | ElementKind::Block(_) => None,
    }
}
