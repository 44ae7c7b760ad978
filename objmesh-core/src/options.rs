/// Per-model configuration
use serde::Deserialize;

use crate::error::MeshResult;

/// Fallback zoom range used when the configured one is inverted.
pub const MIN_ZOOM: f32 = 14.5;
pub const MAX_ZOOM: f32 = 22.0;

/// Used when neither a forced color nor a material color applies.
pub const DEFAULT_COLOR: [f32; 3] = [220.0 / 255.0, 210.0 / 255.0, 200.0 / 255.0];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    /// Forced identifier for every item of the model. 0 means none.
    pub id: Option<u32>,
    /// Forced color for every item of the model.
    pub color: Option<[f32; 3]>,
    pub default_color: [f32; 3],
    /// Fail the whole model on an out-of-range face index instead of
    /// dropping the affected group.
    pub strict: bool,
    pub scale: f32,
    /// Degrees, clockwise seen from above.
    pub rotation: f32,
    /// Meters above ground.
    pub elevation: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            id: None,
            color: None,
            default_color: DEFAULT_COLOR,
            strict: false,
            scale: 1.0,
            rotation: 0.0,
            elevation: 0.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl ModelOptions {
    pub fn from_json(json: &str) -> MeshResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The forced id, ignoring 0 which picking reserves for "no object".
    pub fn forced_id(&self) -> Option<u32> {
        self.id.filter(|&id| id != 0)
    }

    /// Zoom range narrowed to what the application allows.
    pub fn zoom_range(&self, app_min: f32, app_max: f32) -> (f32, f32) {
        let min = self.min_zoom.max(app_min);
        let max = self.max_zoom.min(app_max);
        if max < min {
            (MIN_ZOOM, MAX_ZOOM)
        } else {
            (min, max)
        }
    }
}
