use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::contour::{ContourMarkers, BLACK_PIXEL_VAL, WHITE_PIXEL_VAL};
use crate::errors::{TriangleError, Result};
use crate::feature_extraction::{ExtractionSettings, FeatureMode};
use crate::normalize::BASELINE_WIDTH;
use crate::tolerance::ToleranceSettings;

/// Configuration for a feature extraction run
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Directory with one sub-directory per triangle category
    pub input_dir: String,
    pub output_csv: String,

    #[serde(default = "default_feature_mode")]
    pub feature_mode: FeatureMode,

    /// Where processed rasters are dumped, per category; `None` disables dumps
    #[serde(default)]
    pub processed_images_dir: Option<String>,

    /// Where the batch report is written as JSON; `None` disables it
    #[serde(default)]
    pub report_json: Option<String>,

    /// Images wider or taller than this are resized to this width first; 0 disables
    #[serde(default = "default_resize_width")]
    pub resize_width: u32,

    #[serde(default)]
    pub crop_to_contour: bool,

    #[serde(default = "default_crop_bottom_margin")]
    pub crop_bottom_margin: u32,

    /// Intensities that mark a contour cell after edge filtering
    #[serde(default = "default_contour_marker_values")]
    pub contour_marker_values: [i32; 2],

    // Vertex merging
    #[serde(default = "default_initial_tolerance_percent")]
    pub initial_tolerance_percent: u32,

    #[serde(default = "default_tolerance_step_percent")]
    pub tolerance_step_percent: u32,

    #[serde(default = "default_max_tolerance_escalations")]
    pub max_tolerance_escalations: u32,

    #[serde(default = "default_baseline_width")]
    pub baseline_width: u32,

    #[serde(default)]
    pub use_parallel: bool,

    /// Skip files that cannot be decoded instead of aborting the batch
    #[serde(default)]
    pub skip_unreadable_images: bool,
}

fn default_feature_mode() -> FeatureMode {
    FeatureMode::PrincipalPoints
}

fn default_resize_width() -> u32 {
    28
}

fn default_crop_bottom_margin() -> u32 {
    5
}

fn default_contour_marker_values() -> [i32; 2] {
    [WHITE_PIXEL_VAL, BLACK_PIXEL_VAL]
}

fn default_initial_tolerance_percent() -> u32 {
    3
}

fn default_tolerance_step_percent() -> u32 {
    1
}

fn default_max_tolerance_escalations() -> u32 {
    100
}

fn default_baseline_width() -> u32 {
    BASELINE_WIDTH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: "./images".to_string(),
            output_csv: "./out.csv".to_string(),
            feature_mode: default_feature_mode(),
            processed_images_dir: None,
            report_json: None,
            resize_width: default_resize_width(),
            crop_to_contour: false,
            crop_bottom_margin: default_crop_bottom_margin(),
            contour_marker_values: default_contour_marker_values(),
            initial_tolerance_percent: default_initial_tolerance_percent(),
            tolerance_step_percent: default_tolerance_step_percent(),
            max_tolerance_escalations: default_max_tolerance_escalations(),
            baseline_width: default_baseline_width(),
            use_parallel: false,
            skip_unreadable_images: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TriangleError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|source| TriangleError::ConfigLoad {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let input_dir = PathBuf::from(&self.input_dir);
        if !input_dir.is_dir() {
            return Err(TriangleError::InvalidPath(input_dir));
        }

        if self.output_csv.trim().is_empty() {
            return Err(TriangleError::Config("output_csv must not be empty".to_string()));
        }

        if self.initial_tolerance_percent == 0 {
            return Err(TriangleError::Config(
                "initial_tolerance_percent must be > 0".to_string(),
            ));
        }

        if self.tolerance_step_percent == 0 {
            return Err(TriangleError::Config(
                "tolerance_step_percent must be > 0".to_string(),
            ));
        }

        if self.baseline_width == 0 {
            return Err(TriangleError::Config("baseline_width must be > 0".to_string()));
        }

        if self.contour_marker_values[0] == self.contour_marker_values[1] {
            return Err(TriangleError::Config(
                "contour_marker_values must hold two different values".to_string(),
            ));
        }

        Ok(())
    }

    /// Target width of the resize step, `None` when resizing is disabled
    pub fn resize_target(&self) -> Option<u32> {
        (self.resize_width > 0).then_some(self.resize_width)
    }

    /// Settings for the per-image extraction stages
    pub fn extraction_settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            markers: ContourMarkers::new(self.contour_marker_values),
            tolerance: ToleranceSettings {
                initial_percent: self.initial_tolerance_percent,
                step_percent: self.tolerance_step_percent,
                max_escalations: self.max_tolerance_escalations,
            },
            baseline_width: self.baseline_width,
        }
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            TriangleError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            input_dir = "samples"
            output_csv = "features.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.feature_mode, FeatureMode::PrincipalPoints);
        assert_eq!(config.resize_target(), Some(28));
        assert_eq!(config.contour_marker_values, [-1, 255]);
        assert_eq!(config.extraction_settings(), ExtractionSettings::default());
    }

    #[test]
    fn overrides_are_read() {
        let config: Config = toml::from_str(
            r#"
            input_dir = "samples"
            output_csv = "bbox.csv"
            feature_mode = "bounding_box"
            max_tolerance_escalations = 10
            use_parallel = true
            resize_width = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.feature_mode, FeatureMode::BoundingBox);
        assert_eq!(config.extraction_settings().tolerance.max_escalations, 10);
        assert!(config.use_parallel);
        assert_eq!(config.resize_target(), None);
    }

    #[test]
    fn save_and_reload() {
        let path = std::env::temp_dir().join(format!("triangle_features_config_{}.toml", std::process::id()));
        let mut config = Config::default();
        config.processed_images_dir = Some("processed".to_string());
        config.save_to_file(&path).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config::default();
        config.input_dir = std::env::temp_dir().display().to_string();
        assert!(config.validate().is_ok());

        config.tolerance_step_percent = 0;
        assert!(matches!(config.validate(), Err(TriangleError::Config(_))));

        let mut config = Config::default();
        config.input_dir = "/definitely/not/here".to_string();
        assert!(matches!(config.validate(), Err(TriangleError::InvalidPath(_))));
    }
}
