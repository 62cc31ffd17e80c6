//! Session configuration.

use nb_core::DEFAULT_STORAGE_KEY;
use nb_ink::{Color, PenSettings};
use serde::Deserialize;

/// Host-supplied settings. Every field is optional in the serialized form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Slot the notebook is persisted under.
    pub storage_key: String,
    pub pen_color: String,
    pub pen_size: f32,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            pen_color: "#1f2a33".to_string(),
            pen_size: 3.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl SessionConfig {
    pub fn pen(&self) -> PenSettings {
        PenSettings {
            color: Color::from_hex_or_black(&self.pen_color),
            size: if self.pen_size > 0.0 { self.pen_size } else { 3.0 },
        }
    }
}
