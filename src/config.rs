//! Engine configuration.

use crate::error::{EngineError, EngineResult};
use crate::services::DetectionLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable parameters for the engine.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cosmetic width added to the render box of detector entities.
    /// Never applied to the document box.
    pub detector_render_padding: f64,

    /// Fraction of a page that must be visible for it to become current.
    pub page_visibility_threshold: f64,

    /// Drags smaller than this (render units) in either axis are treated
    /// as cancelled.
    pub min_selection_extent: f64,

    /// Level sent to the detector with each request.
    pub detection_level: DetectionLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detector_render_padding: 6.0,
            page_visibility_threshold: 0.3,
            min_selection_extent: 0.5,
            detection_level: DetectionLevel::Low,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the detector render padding.
    pub fn with_detector_render_padding(mut self, padding: f64) -> Self {
        self.detector_render_padding = padding;
        self
    }

    /// Sets the page visibility threshold.
    pub fn with_page_visibility_threshold(mut self, threshold: f64) -> Self {
        self.page_visibility_threshold = threshold;
        self
    }

    /// Sets the minimum drag extent.
    pub fn with_min_selection_extent(mut self, extent: f64) -> Self {
        self.min_selection_extent = extent;
        self
    }

    /// Sets the detection level.
    pub fn with_detection_level(mut self, level: DetectionLevel) -> Self {
        self.detection_level = level;
        self
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|source| EngineError::Serialization {
                context: "engine config".to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            EngineError::invalid("config", format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.detector_render_padding.is_finite() || self.detector_render_padding < 0.0 {
            return Err(EngineError::invalid(
                "detector_render_padding",
                "must be a finite, non-negative number",
            ));
        }
        let threshold = self.page_visibility_threshold;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
            return Err(EngineError::invalid(
                "page_visibility_threshold",
                "must be in (0, 1]",
            ));
        }
        if !self.min_selection_extent.is_finite() || self.min_selection_extent < 0.0 {
            return Err(EngineError::invalid(
                "min_selection_extent",
                "must be a finite, non-negative number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detector_render_padding, 6.0);
        assert_eq!(config.page_visibility_threshold, 0.3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"detection_level":"high"}"#).unwrap();
        assert_eq!(config.detection_level, DetectionLevel::High);
        assert_eq!(config.detector_render_padding, 6.0);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = EngineConfig::new()
            .with_page_visibility_threshold(1.5)
            .validate()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = EngineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, EngineError::Serialization { .. }));
    }
}
