use crate::error::{DrilldownError, Result};
use crate::models::ColorMode;
use crate::processing::ColorSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Set explicitly by the caller
    Explicit,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Explicit => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// How positions between two survey stations are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Straight line between the bracketing station positions
    #[default]
    Linear,
    /// Along the constant-curvature arc joining the stations
    Arc,
}

/// Layered configuration for Drilldown
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub color_seed: ConfigValue<u64>,
    pub pastel_factor: ConfigValue<f64>,
    pub color_mode: ConfigValue<ColorMode>,
    pub interpolation: ConfigValue<Interpolation>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let colors = ColorSettings::default();
        Self {
            color_seed: ConfigValue::new(colors.seed, ConfigSource::Default),
            pastel_factor: ConfigValue::new(colors.pastel_factor, ConfigSource::Default),
            color_mode: ConfigValue::new(colors.mode, ConfigSource::Default),
            interpolation: ConfigValue::new(Interpolation::default(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DrilldownError::ConfigNotFound { path: path.to_path_buf() });
        }

        let content = fs::read_to_string(path)?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| DrilldownError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        // Update values from file
        if let Some(seed) = file_config.color_seed {
            self.color_seed.update(seed, ConfigSource::File);
        }

        if let Some(pastel_factor) = file_config.pastel_factor {
            let pastel_factor = validate_pastel_factor(pastel_factor)?;
            self.pastel_factor.update(pastel_factor, ConfigSource::File);
        }

        if let Some(color_mode) = file_config.color_mode {
            self.color_mode.update(color_mode, ConfigSource::File);
        }

        if let Some(interpolation) = file_config.interpolation {
            self.interpolation.update(interpolation, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // DRILLDOWN_COLOR_SEED
        if let Ok(seed_str) = env::var("DRILLDOWN_COLOR_SEED") {
            match seed_str.parse::<u64>() {
                Ok(seed) => self.color_seed.update(seed, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid DRILLDOWN_COLOR_SEED value '{}': expected unsigned integer",
                    seed_str
                ),
            }
        }

        // DRILLDOWN_PASTEL_FACTOR
        if let Ok(pastel_str) = env::var("DRILLDOWN_PASTEL_FACTOR") {
            match pastel_str.parse::<f64>().ok().and_then(|p| validate_pastel_factor(p).ok()) {
                Some(pastel) => self.pastel_factor.update(pastel, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid DRILLDOWN_PASTEL_FACTOR value '{}': expected number between 0 and 1",
                    pastel_str
                ),
            }
        }

        // DRILLDOWN_COLOR_MODE
        if let Ok(mode_str) = env::var("DRILLDOWN_COLOR_MODE") {
            match parse_color_mode(&mode_str) {
                Ok(mode) => self.color_mode.update(mode, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid DRILLDOWN_COLOR_MODE value '{}': expected cycle or distinct",
                    mode_str
                ),
            }
        }

        // DRILLDOWN_INTERPOLATION
        if let Ok(interp_str) = env::var("DRILLDOWN_INTERPOLATION") {
            match parse_interpolation(&interp_str) {
                Ok(interp) => self.interpolation.update(interp, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid DRILLDOWN_INTERPOLATION value '{}': expected linear or arc",
                    interp_str
                ),
            }
        }

        self
    }

    /// Apply explicit overrides from the caller
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if let Some(seed) = overrides.color_seed {
            self.color_seed.update(seed, ConfigSource::Explicit);
        }

        if let Some(pastel_factor) = overrides.pastel_factor {
            let pastel_factor = validate_pastel_factor(pastel_factor)?;
            self.pastel_factor.update(pastel_factor, ConfigSource::Explicit);
        }

        if let Some(color_mode) = overrides.color_mode {
            self.color_mode.update(color_mode, ConfigSource::Explicit);
        }

        if let Some(interpolation) = overrides.interpolation {
            self.interpolation.update(interpolation, ConfigSource::Explicit);
        }

        Ok(())
    }

    /// Color settings resolved from the current layers
    pub fn color_settings(&self) -> ColorSettings {
        ColorSettings {
            seed: self.color_seed.value,
            pastel_factor: self.pastel_factor.value,
            mode: self.color_mode.value,
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "color_seed".to_string(),
            (self.color_seed.value.to_string(), self.color_seed.source),
        );

        map.insert(
            "pastel_factor".to_string(),
            (self.pastel_factor.value.to_string(), self.pastel_factor.source),
        );

        map.insert(
            "color_mode".to_string(),
            (format!("{:?}", self.color_mode.value), self.color_mode.source),
        );

        map.insert(
            "interpolation".to_string(),
            (format!("{:?}", self.interpolation.value), self.interpolation.source),
        );

        map
    }
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    color_seed: Option<u64>,
    pastel_factor: Option<f64>,
    color_mode: Option<ColorMode>,
    interpolation: Option<Interpolation>,
}

/// Explicit configuration overrides
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub color_seed: Option<u64>,
    pub pastel_factor: Option<f64>,
    pub color_mode: Option<ColorMode>,
    pub interpolation: Option<Interpolation>,
}

/// Parse color mode from string
pub fn parse_color_mode(s: &str) -> Result<ColorMode> {
    match s.to_lowercase().as_str() {
        "cycle" => Ok(ColorMode::Cycle),
        "distinct" => Ok(ColorMode::Distinct),
        _ => Err(DrilldownError::ConfigInvalid {
            key: "color_mode".to_string(),
            reason: format!("Invalid color mode: {}. Use cycle or distinct", s),
        }),
    }
}

/// Parse interpolation from string
pub fn parse_interpolation(s: &str) -> Result<Interpolation> {
    match s.to_lowercase().as_str() {
        "linear" => Ok(Interpolation::Linear),
        "arc" | "minimum_curvature" => Ok(Interpolation::Arc),
        _ => Err(DrilldownError::ConfigInvalid {
            key: "interpolation".to_string(),
            reason: format!("Invalid interpolation: {}. Use linear or arc", s),
        }),
    }
}

fn validate_pastel_factor(value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DrilldownError::ConfigInvalid {
            key: "pastel_factor".to_string(),
            reason: format!("{} is outside 0-1", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.color_seed.value, 999);
        assert_eq!(config.color_seed.source, ConfigSource::Default);
        assert_eq!(config.pastel_factor.value, 0.2);
        assert_eq!(config.color_mode.value, ColorMode::Cycle);
        assert_eq!(config.interpolation.value, Interpolation::Linear);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        // Explicit should override environment
        value.update(400, ConfigSource::Explicit);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Explicit);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Explicit);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
color_seed = 42
pastel_factor = 0.5
color_mode = "distinct"
interpolation = "arc"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.color_seed.value, 42);
        assert_eq!(config.color_seed.source, ConfigSource::File);
        assert_eq!(config.pastel_factor.value, 0.5);
        assert_eq!(config.color_mode.value, ColorMode::Distinct);
        assert_eq!(config.interpolation.value, Interpolation::Arc);
    }

    #[test]
    fn test_file_rejects_bad_pastel_factor() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "pastel_factor = 3.0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(DrilldownError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/drilldown.toml");
        assert!(matches!(result, Err(DrilldownError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_explicit_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = ConfigOverrides {
            color_seed: Some(7),
            color_mode: Some(ColorMode::Distinct),
            ..Default::default()
        };

        config.apply_overrides(overrides).unwrap();

        assert_eq!(config.color_seed.value, 7);
        assert_eq!(config.color_seed.source, ConfigSource::Explicit);
        assert_eq!(config.color_mode.value, ColorMode::Distinct);
        // These should still be defaults
        assert_eq!(config.pastel_factor.source, ConfigSource::Default);
        assert_eq!(config.interpolation.source, ConfigSource::Default);

        let settings = config.color_settings();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.mode, ColorMode::Distinct);
    }

    #[test]
    fn test_parse_color_mode() {
        assert_eq!(parse_color_mode("cycle").unwrap(), ColorMode::Cycle);
        assert_eq!(parse_color_mode("DISTINCT").unwrap(), ColorMode::Distinct);
        assert!(parse_color_mode("rainbow").is_err());
    }

    #[test]
    fn test_parse_interpolation() {
        assert_eq!(parse_interpolation("linear").unwrap(), Interpolation::Linear);
        assert_eq!(parse_interpolation("Arc").unwrap(), Interpolation::Arc);
        assert!(parse_interpolation("spline").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("color_seed"));
        assert!(map.contains_key("interpolation"));

        let (seed_value, seed_source) = &map["color_seed"];
        assert_eq!(seed_value, "999");
        assert_eq!(*seed_source, ConfigSource::Default);
    }
}
