//! Types shared between the relief engine, its CLI and the HTTP server.

use serde::{Deserialize, Serialize};

mod settings;

pub use settings::{ReliefSettings, SettingsSuggestion, MAX_RESOLUTION, MIN_RESOLUTION};

/// Which mesh builder produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Traced contours extruded into vertical-walled solids
    Vector,
    /// Regular grid displaced by brightness
    Heightfield,
}

impl OutputMode {
    pub fn for_settings(settings: &ReliefSettings) -> Self {
        if settings.flat_top {
            OutputMode::Vector
        } else {
            OutputMode::Heightfield
        }
    }
}

/// Where a settings suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// The advisory model answered
    Model,
    /// The advisory call failed and the hard-coded defaults were substituted
    Fallback,
}

/// Advisory response: complete settings plus a human-readable rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryResponse {
    pub settings: ReliefSettings,
    pub rationale: String,
    pub source: SuggestionSource,
}

impl AdvisoryResponse {
    /// The mandatory fallback when the advisory service is unavailable.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            settings: ReliefSettings::default(),
            rationale: reason.into(),
            source: SuggestionSource::Fallback,
        }
    }

    /// Overlay a model suggestion on the defaults and clamp the result.
    pub fn from_suggestion(suggestion: &SettingsSuggestion, rationale: String) -> Self {
        Self {
            settings: ReliefSettings::default().with_suggestion(suggestion).sanitized(),
            rationale,
            source: SuggestionSource::Model,
        }
    }
}

/// Summary of a generated model, returned by the inspect endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    pub mode: OutputMode,
    pub triangles: usize,
    pub polygons: usize,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub diagnostics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(val: &T) {
        let json = serde_json::to_string(val).expect("serialize");
        let back: T = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(*val, back);
    }

    #[test]
    fn test_output_mode_follows_flat_top() {
        let mut s = ReliefSettings::default();
        assert_eq!(OutputMode::for_settings(&s), OutputMode::Vector);
        s.flat_top = false;
        assert_eq!(OutputMode::for_settings(&s), OutputMode::Heightfield);
    }

    #[test]
    fn test_fallback_uses_defaults() {
        let resp = AdvisoryResponse::fallback("no key");
        assert_eq!(resp.settings, ReliefSettings::default());
        assert_eq!(resp.source, SuggestionSource::Fallback);
        roundtrip(&resp);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""source":"fallback""#));
    }

    #[test]
    fn test_from_suggestion_is_sanitized() {
        let suggestion = SettingsSuggestion {
            mask_threshold: Some(7.0),
            ..Default::default()
        };
        let resp = AdvisoryResponse::from_suggestion(&suggestion, "bright logo".to_string());
        assert!(resp.settings.mask_threshold < 1.0);
        assert_eq!(resp.source, SuggestionSource::Model);
    }

    #[test]
    fn test_model_report_serde() {
        roundtrip(&ModelReport {
            mode: OutputMode::Heightfield,
            triangles: 12,
            polygons: 0,
            bounds_min: [-1.0, -1.0, 0.0],
            bounds_max: [1.0, 1.0, 2.0],
            diagnostics: vec!["no contours".to_string()],
        });
    }
}
