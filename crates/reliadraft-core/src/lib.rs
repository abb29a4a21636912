//! ReliaDraft Core Library
//!
//! Element model, mutation gateway and the drag/binding engine behind the
//! ReliaDraft reliability block diagram editor. Rendering, input capture and
//! persistence live outside this crate.

pub mod actions;
pub mod app_state;
pub mod binding;
pub mod config;
pub mod drag;
pub mod element;
pub mod geometry;
pub mod groups;
pub mod mutation;
pub mod scene;

pub use actions::{ActionResult, BlockProperties, DistributionSlot, apply_block_properties, set_as_end_block, set_as_start_block};
pub use app_state::AppState;
pub use binding::{update_block_connectors, update_bound_elements};
pub use config::{ConfigError, ConfigResult, EditorConfig};
pub use drag::{PointerDownState, drag_new_element, drag_selected_elements};
pub use element::{
    BlockElement, ConnectorEnd, Distribution, DistributionError, DistributionName, Element, ElementId, ElementKind,
    ElementType, GroupId,
};
pub use geometry::{DragLock, NewElementDrag};
pub use groups::is_selected_via_group;
pub use mutation::{ElementUpdate, MutationRecord, mutate_element};
pub use scene::{BindingError, Scene, SceneError, SceneResult};
