//! Image elements.

use serde::{Deserialize, Serialize};

/// Whether the image's backing file has been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    #[default]
    Pending,
    Saved,
    Error,
}

/// Reference to an image file placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    pub file_id: Option<String>,
    pub status: ImageStatus,
    /// X and Y scale factors in [-1, 1], negative for flipped axes.
    pub scale: (f64, f64),
}

impl ImageElement {
    pub fn new(file_id: Option<String>) -> Self {
        Self {
            file_id,
            status: ImageStatus::default(),
            scale: (1.0, 1.0),
        }
    }
}
