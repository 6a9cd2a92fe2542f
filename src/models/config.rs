use std::path::Path;
use std::time::Duration;

use resampler::FilterKind;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::models::scale::SCALE_GRID;
use crate::services::resize_task::TaskSettings;

/// Application configuration loaded from a YAML file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Filter selected after an image is loaded
    #[serde(default, deserialize_with = "deserialize_filter")]
    pub default_filter: FilterKind,

    /// Scale change per scale up / scale down action.
    /// Must be a positive multiple of [`SCALE_GRID`].
    #[serde(default = "default_scale_step")]
    pub scale_step: f64,

    /// Progress updates per resize task
    #[serde(default = "default_progress_ticks")]
    pub progress_ticks: u32,

    /// Delay per progress tick at scale 1.0, in milliseconds
    #[serde(default = "default_tick_delay_ms")]
    pub tick_delay_ms: u64,

    /// Resizes producing more pixels than this fail instead of allocating
    #[serde(default = "default_max_output_pixels")]
    pub max_output_pixels: u64,

    /// Initial display area
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Filter used to fit the result into the display area
    #[serde(default)]
    pub fit_filter: FitFilter,
}

fn default_scale_step() -> f64 {
    SCALE_GRID
}

fn default_progress_ticks() -> u32 {
    10
}

fn default_tick_delay_ms() -> u64 {
    30
}

fn default_max_output_pixels() -> u64 {
    100_000_000
}

/// Display area in pixels
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: u32,
    #[serde(default = "default_viewport_height")]
    pub height: u32,
}

fn default_viewport_width() -> u32 {
    900
}

fn default_viewport_height() -> u32 {
    700
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

/// Fast filters allowed for fitting into the viewport
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FitFilter {
    #[default]
    Nearest,
    Bilinear,
}

impl From<FitFilter> for FilterKind {
    fn from(filter: FitFilter) -> Self {
        match filter {
            FitFilter::Nearest => FilterKind::Nearest,
            FitFilter::Bilinear => FilterKind::Bilinear,
        }
    }
}

fn deserialize_filter<'de, D>(deserializer: D) -> Result<FilterKind, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

impl AppConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let steps = self.scale_step / SCALE_GRID;
        let on_grid = steps.is_finite() && (steps - steps.round()).abs() < 1e-6;
        if !on_grid || self.scale_step <= 0.0 {
            return Err(ConfigError::InvalidScaleStep(self.scale_step));
        }
        Ok(())
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration, falling back to defaults on any error
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file given, using defaults");
            return Self::default();
        };

        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    default_filter = %config.default_filter,
                    ticks = config.progress_ticks,
                    "Loaded configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(%e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Settings handed to every resize task
    pub fn task_settings(&self) -> TaskSettings {
        TaskSettings {
            ticks: self.progress_ticks,
            tick_delay: Duration::from_millis(self.tick_delay_ms),
            max_output_pixels: self.max_output_pixels,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_filter: FilterKind::default(),
            scale_step: default_scale_step(),
            progress_ticks: default_progress_ticks(),
            tick_delay_ms: default_tick_delay_ms(),
            max_output_pixels: default_max_output_pixels(),
            viewport: ViewportConfig::default(),
            fit_filter: FitFilter::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.default_filter, FilterKind::Bicubic);
        assert_eq!(config.scale_step, 0.05);
        assert_eq!(config.progress_ticks, 10);
        assert_eq!(config.viewport, ViewportConfig { width: 900, height: 700 });
        assert_eq!(config.fit_filter, FitFilter::Nearest);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
default_filter: Lanczos
tick_delay_ms: 0
viewport:
  width: 320
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.default_filter, FilterKind::Lanczos);
        assert_eq!(config.tick_delay_ms, 0);
        assert_eq!(config.viewport.width, 320);
        assert_eq!(config.viewport.height, 700);
        assert_eq!(config.progress_ticks, 10);
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        let result = AppConfig::from_yaml("default_filter: mitchell");
        match result {
            Err(ConfigError::Parse(e)) => assert!(e.to_string().contains("mitchell")),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_fit_filter_parses_lowercase() {
        let config = AppConfig::from_yaml("fit_filter: bilinear").unwrap();
        assert_eq!(config.fit_filter, FitFilter::Bilinear);
        assert_eq!(FilterKind::from(config.fit_filter), FilterKind::Bilinear);
    }

    #[test]
    fn test_scale_step_on_grid_is_accepted() {
        for yaml in ["scale_step: 0.05", "scale_step: 0.1", "scale_step: 0.25"] {
            assert!(AppConfig::from_yaml(yaml).is_ok(), "{}", yaml);
        }
    }

    #[test]
    fn test_scale_step_off_grid_is_rejected() {
        for (yaml, step) in [
            ("scale_step: 0.03", 0.03),
            ("scale_step: 0.07", 0.07),
            ("scale_step: 0", 0.0),
            ("scale_step: -0.05", -0.05),
            ("scale_step: .nan", f64::NAN),
        ] {
            match AppConfig::from_yaml(yaml) {
                Err(ConfigError::InvalidScaleStep(got)) => {
                    assert!(got == step || (got.is_nan() && step.is_nan()), "{}", yaml)
                }
                other => panic!("Expected InvalidScaleStep for {}, got {:?}", yaml, other),
            }
        }
    }

    #[test]
    fn test_load_off_grid_step_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scale_step: 0.03\nprogress_ticks: 4").unwrap();

        let config = AppConfig::load(Some(file.path()));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/scaler.yaml")));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "progress_ticks: 4\nscale_step: 0.1").unwrap();

        let config = AppConfig::load(Some(file.path()));
        assert_eq!(config.progress_ticks, 4);
        assert_eq!(config.scale_step, 0.1);
    }

    #[test]
    fn test_task_settings() {
        let config = AppConfig {
            tick_delay_ms: 25,
            progress_ticks: 3,
            ..Default::default()
        };
        let settings = config.task_settings();
        assert_eq!(settings.ticks, 3);
        assert_eq!(settings.tick_delay, Duration::from_millis(25));
    }
}
