//! Editor tuning, loadable from TOML.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```toml
//! [history]
//! capacity = 20
//!
//! [camera]
//! max_zoom = 8.0
//! ```

use crate::error::{EditorError, Result};
use crate::geometry::{MAX_ZOOM, MIN_ZOOM};
use crate::history::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub camera: CameraConfig,
    pub interaction: InteractionConfig,
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Undo entries kept before the oldest is evicted.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: DEFAULT_CAPACITY }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Multiplicative step for keyboard zoom in/out.
    pub zoom_step: f32,
    /// Zoom change per wheel delta unit when zooming with the wheel.
    pub wheel_zoom_speed: f32,
    /// World-space padding around the content for zoom-to-fit.
    pub fit_padding: f32,
    /// Zoom-to-fit never zooms in past this.
    pub fit_max_zoom: f32,
    pub animation_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: 1.2,
            wheel_zoom_speed: 0.002,
            fit_padding: 50.0,
            fit_max_zoom: 1.5,
            animation_ms: 300,
        }
    }
}

/// Pointer tolerances. Radii and thresholds are in screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub port_radius: f32,
    pub snap_radius: f32,
    pub edge_hit_threshold: f32,
    pub endpoint_threshold: f32,
    pub marquee_threshold: f32,
    /// Movement below this keeps a connector press a click.
    pub click_threshold: f32,
    /// World-space offset of duplicated nodes on both axes.
    pub duplicate_offset: f32,
    /// World-space margin between grouped nodes and the group frame.
    pub group_padding: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            port_radius: 8.0,
            snap_radius: 40.0,
            edge_hit_threshold: 8.0,
            endpoint_threshold: 16.0,
            marquee_threshold: 4.0,
            click_threshold: 3.0,
            duplicate_offset: 20.0,
            group_padding: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// How long a finished model node keeps its completed state before it
    /// returns to idle and its output gets selected.
    pub completion_display_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { completion_display_ms: 1500 }
    }
}

impl EditorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::info!("loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Like [`load`](Self::load), but falls back to defaults when the file is
    /// missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(EditorError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("ignoring config {}: {e}", path.as_ref().display());
                Self::default()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EditorError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let camera = &self.camera;
        if !(camera.min_zoom > 0.0) {
            return Err(EditorError::InvalidConfig(format!(
                "camera.min_zoom must be positive, got {}",
                camera.min_zoom
            )));
        }
        if !(camera.min_zoom <= camera.max_zoom) {
            return Err(EditorError::InvalidConfig(format!(
                "camera.min_zoom ({}) exceeds camera.max_zoom ({})",
                camera.min_zoom, camera.max_zoom
            )));
        }
        if !(camera.zoom_step > 1.0) {
            return Err(EditorError::InvalidConfig("camera.zoom_step must be greater than 1".into()));
        }
        if self.history.capacity == 0 {
            return Err(EditorError::InvalidConfig("history.capacity must be at least 1".into()));
        }

        let i = &self.interaction;
        let radii = [
            ("port_radius", i.port_radius),
            ("snap_radius", i.snap_radius),
            ("edge_hit_threshold", i.edge_hit_threshold),
            ("endpoint_threshold", i.endpoint_threshold),
            ("marquee_threshold", i.marquee_threshold),
            ("click_threshold", i.click_threshold),
            ("group_padding", i.group_padding),
        ];
        if let Some((name, value)) = radii.iter().find(|(_, v)| !(*v >= 0.0)) {
            return Err(EditorError::InvalidConfig(format!(
                "interaction.{name} must be non-negative, got {value}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history.capacity, 5);
        assert_eq!(config.camera.min_zoom, 0.1);
        assert_eq!(config.camera.max_zoom, 4.0);
        assert_eq!(config.camera.fit_max_zoom, 1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = EditorConfig::from_toml_str(
            r#"
            [history]
            capacity = 20

            [camera]
            max_zoom = 8.0
            "#,
        )
        .unwrap();
        assert_eq!(config.history.capacity, 20);
        assert_eq!(config.camera.max_zoom, 8.0);
        assert_eq!(config.camera.min_zoom, 0.1);
        assert_eq!(config.interaction, InteractionConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EditorConfig::from_toml_str("").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_invalid_zoom_range_rejected() {
        let err = EditorConfig::from_toml_str("[camera]\nmin_zoom = 5.0\nmax_zoom = 2.0\n").unwrap_err();
        assert!(matches!(err, EditorError::InvalidConfig(_)));
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = EditorConfig::from_toml_str("[history]\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, EditorError::InvalidConfig(_)));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let err = EditorConfig::from_toml_str("[interaction]\nsnap_radius = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("snap_radius"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = EditorConfig::from_toml_str("[history\ncapacity = ").unwrap_err();
        assert!(matches!(err, EditorError::Toml(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = EditorConfig::default();
        config.execution.completion_display_ms = 250;
        let text = config.to_toml_string().unwrap();
        assert_eq!(EditorConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = EditorConfig::load_or_default("/definitely/not/here/editor.toml");
        assert_eq!(config, EditorConfig::default());
    }
}
