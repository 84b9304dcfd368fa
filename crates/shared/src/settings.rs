use serde::{Deserialize, Serialize};

/// Smallest grid the pipeline accepts. A 1×1 field has no cells to trace.
pub const MIN_RESOLUTION: u32 = 2;
/// Largest grid the pipeline accepts.
pub const MAX_RESOLUTION: u32 = 1024;

/// User-facing generation settings.
///
/// Field names serialize in camelCase to match the JSON accepted by the CLI
/// (`--settings`), the server query strings and the advisory prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReliefSettings {
    /// Extrusion height (vector mode) or maximum relief height (heightfield mode), mm
    pub height_scale: f64,
    /// Base slab / relief floor thickness, mm
    pub base_thickness: f64,
    /// Side length of the square sample grid, px
    pub resolution: u32,
    /// Swap foreground and background
    pub invert: bool,
    /// Iso-level for contour tracing, in (0, 1)
    pub mask_threshold: f64,
    /// Linear contrast stretch about 0.5, applied when > 1
    pub contrast: f64,
    /// Douglas-Peucker tolerance in grid units
    pub simplification: f64,
    /// Add a flat slab under the extruded shapes
    pub enable_base: bool,
    /// `true` = extruded vector contours, `false` = heightfield relief
    pub flat_top: bool,
}

impl Default for ReliefSettings {
    fn default() -> Self {
        Self {
            height_scale: 5.0,
            base_thickness: 2.0,
            resolution: 256,
            invert: false,
            mask_threshold: 0.5,
            contrast: 1.0,
            simplification: 0.5,
            enable_base: true,
            flat_top: true,
        }
    }
}

impl ReliefSettings {
    /// Clamp every field into the range the pipeline accepts.
    ///
    /// Non-finite values fall back to the default for that field.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };

        Self {
            height_scale: finite_or(self.height_scale, defaults.height_scale).max(0.01),
            base_thickness: finite_or(self.base_thickness, defaults.base_thickness).max(0.0),
            resolution: self.resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION),
            invert: self.invert,
            mask_threshold: finite_or(self.mask_threshold, defaults.mask_threshold)
                .clamp(0.01, 0.99),
            contrast: finite_or(self.contrast, defaults.contrast).max(1.0),
            simplification: finite_or(self.simplification, defaults.simplification).max(0.0),
            enable_base: self.enable_base,
            flat_top: self.flat_top,
        }
    }

    /// Overlay the fields present in a (partial) suggestion.
    pub fn with_suggestion(&self, suggestion: &SettingsSuggestion) -> Self {
        Self {
            height_scale: suggestion.height_scale.unwrap_or(self.height_scale),
            base_thickness: suggestion.base_thickness.unwrap_or(self.base_thickness),
            resolution: suggestion.resolution.unwrap_or(self.resolution),
            invert: suggestion.invert.unwrap_or(self.invert),
            mask_threshold: suggestion.mask_threshold.unwrap_or(self.mask_threshold),
            contrast: suggestion.contrast.unwrap_or(self.contrast),
            simplification: suggestion.simplification.unwrap_or(self.simplification),
            enable_base: suggestion.enable_base.unwrap_or(self.enable_base),
            flat_top: suggestion.flat_top.unwrap_or(self.flat_top),
        }
    }
}

/// Best-effort partial settings, as returned by the advisory service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsSuggestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simplification: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_base: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat_top: Option<bool>,
}

impl SettingsSuggestion {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
