//! Text elements, optionally bound to a container.

use super::ElementId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
}

/// Text content and layout hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub text: String,
    pub font_size: f64,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    /// Container this text labels, if any.
    pub container_id: Option<ElementId>,
}

impl TextElement {
    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.25;

    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        Self {
            text: text.into(),
            font_size,
            text_align: TextAlign::default(),
            vertical_align: VerticalAlign::default(),
            container_id: None,
        }
    }

    /// Approximate text extents without a font backend.
    pub fn measure(&self) -> (f64, f64) {
        let lines: Vec<&str> = self.text.lines().collect();
        let max_chars = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let line_count = lines.len().max(1);
        (
            max_chars as f64 * self.font_size * 0.6,
            line_count as f64 * self.font_size * Self::LINE_HEIGHT,
        )
    }
}
