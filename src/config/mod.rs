use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sampling::{ConfidenceLevel, MarginOfError, PopulationSize, SizingRequest};

/// Starting values for the form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct FormDefaults {
    #[serde(default)]
    pub population: PopulationSize,
    #[serde(default)]
    pub confidence: ConfidenceLevel,
    #[serde(default)]
    pub margin: MarginOfError,
}

impl FormDefaults {
    /// Request the form opens with. Margins outside the slider are pulled back into it.
    pub fn request(&self) -> SizingRequest {
        let mut margin = self.margin;
        if !margin.within_slider() {
            let clamped = margin.step(0);
            tracing::warn!("Default margin {} is outside the slider, using {}", margin, clamped);
            margin = clamped;
        }
        SizingRequest::new(self.population, self.confidence, margin)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChartConfig {
    /// Upper bound on plotted points; larger bills are downsampled
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

fn default_max_points() -> usize {
    400
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { max_points: default_max_points() }
    }
}

/// Optional colour overrides as `#RRGGBB` or `#RGB`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Form starting values
    #[serde(default)]
    pub defaults: FormDefaults,

    /// Chart rendering
    #[serde(default)]
    pub chart: ChartConfig,

    /// Colour overrides
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl AppConfig {
    /// Default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("billsample");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default path, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) if path.exists() => Self::load_or_default(&path),
            Ok(_) => AppConfig::default(),
            Err(e) => {
                tracing::warn!("{}", e);
                AppConfig::default()
            }
        }
    }

    /// Load config from `path`, logging and falling back to defaults on failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {:#}", e);
                AppConfig::default()
            }
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            defaults: FormDefaults {
                population: PopulationSize::new(1200).unwrap(),
                confidence: ConfidenceLevel::P99,
                margin: MarginOfError::new(3).unwrap(),
            },
            chart: ChartConfig { max_points: 250 },
            theme: ThemeConfig {
                accent: Some("#ffc107".to_string()),
                ..ThemeConfig::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
        assert!(serialized.contains("confidence = 99"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("[defaults]\npopulation = 42\n").unwrap();

        assert_eq!(config.defaults.population.get(), 42);
        assert_eq!(config.defaults.confidence, ConfidenceLevel::P95);
        assert_eq!(config.defaults.margin.percent(), 5);
        assert_eq!(config.chart.max_points, 400);
        assert!(config.theme.accent.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(toml::from_str::<AppConfig>("[defaults]\nconfidence = 80\n").is_err());
        assert!(toml::from_str::<AppConfig>("[defaults]\npopulation = 0\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\nmargin = 2\n\n[chart]\nmax_points = 50").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.defaults.margin.percent(), 2);
        assert_eq!(config.chart.max_points, 50);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "defaults = [[[").unwrap();

        assert!(AppConfig::load_from(file.path()).is_err());
        assert_eq!(AppConfig::load_or_default(file.path()), AppConfig::default());
    }

    #[test]
    fn test_wide_default_margin_is_clamped_for_form() {
        let defaults = FormDefaults {
            margin: MarginOfError::new(40).unwrap(),
            ..FormDefaults::default()
        };
        assert_eq!(defaults.request().margin.percent(), 10);
    }
}
