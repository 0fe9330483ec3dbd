//! Main PratibimbaConfig and conversion methods.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::capture::{CaptureSection, DetectionSection};
use super::error::ConfigLoadError;
use super::grid::GridSection;
use super::timers::TimerSection;
use crate::grid::VoxelSizing;
use crate::lifecycle::LifecycleConfig;

/// Full Pratibimba configuration loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PratibimbaConfig {
    /// Voxel grid settings
    #[serde(default)]
    pub grid: GridSection,

    /// Watchdog and message timing
    #[serde(default)]
    pub timers: TimerSection,

    /// Detection statistics settings
    #[serde(default)]
    pub detection: DetectionSection,

    /// Capture settings
    #[serde(default)]
    pub capture: CaptureSection,
}

impl PratibimbaConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/config.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/config.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigLoadError::Parse(format!(
                    "{} must be positive, got {}",
                    name, v
                )))
            }
        };

        positive("grid.small_object_threshold", self.grid.small_object_threshold as f64)?;
        positive("grid.default_voxel_edge", self.grid.default_voxel_edge as f64)?;
        positive("grid.small_object_divisions", self.grid.small_object_divisions as f64)?;
        positive("timers.no_detection_secs", self.timers.no_detection_secs)?;
        positive("timers.max_scan_secs", self.timers.max_scan_secs)?;
        positive("timers.limited_tracking_secs", self.timers.limited_tracking_secs)?;
        positive("timers.advisory_display_secs", self.timers.advisory_display_secs)?;
        positive("capture.max_reference_points", self.capture.max_reference_points as f64)?;

        let buffer = self.detection.display_buffer_secs;
        if !(buffer.is_finite() && buffer >= 0.0) {
            return Err(ConfigLoadError::Parse(format!(
                "detection.display_buffer_secs must be non-negative, got {}",
                buffer
            )));
        }
        Ok(())
    }

    /// Voxel sizing for the grid builder
    pub fn to_voxel_sizing(&self) -> VoxelSizing {
        self.grid.to_voxel_sizing()
    }

    /// Convert to LifecycleConfig for ScanLifecycle
    pub fn to_lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            sizing: self.grid.to_voxel_sizing(),
            watchdogs: self.timers.to_watchdog_config(),
            advisory_display: self.timers.advisory_display(),
            display_buffer_secs: self.detection.display_buffer_secs,
            max_reference_points: self.capture.max_reference_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::AxisCountStrategy;
    use std::time::Duration;

    #[test]
    fn test_default_matches_lifecycle_default() {
        let config = PratibimbaConfig::default();
        assert_eq!(config.to_lifecycle_config(), LifecycleConfig::default());
        assert_eq!(config.to_voxel_sizing(), VoxelSizing::default());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = PratibimbaConfig::from_yaml("{}").unwrap();
        assert_eq!(config.to_lifecycle_config(), LifecycleConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
grid:
  axis_count: extent
  default_voxel_edge: 0.05
timers:
  no_detection_secs: 8
"#;
        let config = PratibimbaConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.grid.axis_count, AxisCountStrategy::Extent);
        assert_eq!(config.grid.small_object_threshold, 0.381);
        assert_eq!(config.grid.default_voxel_edge, 0.05);

        let lifecycle = config.to_lifecycle_config();
        assert_eq!(lifecycle.watchdogs.no_detection, Duration::from_secs(8));
        assert_eq!(lifecycle.watchdogs.max_scan, Duration::from_secs(300));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = PratibimbaConfig::from_yaml("timers:\n  max_scan_secs: -1\n");
        assert!(matches!(result, Err(ConfigLoadError::Parse(_))));

        let result = PratibimbaConfig::from_yaml("grid:\n  axis_count: sideways\n");
        assert!(matches!(result, Err(ConfigLoadError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = PratibimbaConfig::load(Path::new("/nonexistent/pratibimba.yaml"));
        assert!(matches!(result, Err(ConfigLoadError::Io(_))));
    }
}
