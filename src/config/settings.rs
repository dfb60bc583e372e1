//! Configuration settings for the Hearth engine.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub dedup: DedupConfig,
    pub cache: CacheConfig,
    pub review: ReviewConfig,
    pub ocr: OcrConfig,
    pub timezone: TimezoneConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            dedup: DedupConfig::default(),
            cache: CacheConfig::default(),
            review: ReviewConfig::default(),
            ocr: OcrConfig::default(),
            timezone: TimezoneConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("hearth.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("hearth/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".hearth/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.extraction.min_confidence) {
            return Err(ConfigError::Invalid(
                "extraction.min_confidence must be within 0.0..=1.0".to_string(),
            )
            .into());
        }

        if self.extraction.max_title_len == 0 {
            return Err(
                ConfigError::Invalid("extraction.max_title_len must be > 0".to_string()).into(),
            );
        }

        if !(0.0..=1.0).contains(&self.review.confidence_threshold) {
            return Err(ConfigError::Invalid(
                "review.confidence_threshold must be within 0.0..=1.0".to_string(),
            )
            .into());
        }

        if self.dedup.proximity_hours == 0 {
            return Err(
                ConfigError::Invalid("dedup.proximity_hours must be > 0".to_string()).into(),
            );
        }

        if self.ocr.enabled && self.ocr.base_url.is_empty() {
            return Err(ConfigError::MissingField("ocr.base_url".to_string()).into());
        }

        Ok(())
    }

    /// Expand a configured path, resolving `~` and environment variables.
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).as_ref())
    }
}

/// Extraction pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum confidence an extracted event must reach to be considered at all.
    pub min_confidence: f32,
    /// Maximum length of a generated title before truncation.
    pub max_title_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            max_title_len: 80,
        }
    }
}

/// Deduplication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Enable the duplicate check on insert.
    pub enabled: bool,
    /// Proximity window in hours; signature matches within this window of
    /// the candidate count as true duplicates even across midnight.
    pub proximity_hours: u32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            proximity_hours: 3,
        }
    }
}

/// Repository cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the in-memory event cache.
    pub enabled: bool,
    /// Maximum number of cached events.
    pub max_entries: u64,
    /// Time-to-live for cached entries in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10_000,
            ttl_secs: 600,
        }
    }
}

/// Manual review routing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Extractions scoring below this are queued for review instead of
    /// being committed.
    pub confidence_threshold: f32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
        }
    }
}

/// OCR backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Whether image intake is enabled.
    pub enabled: bool,
    /// Base URL of the OCR backend.
    pub base_url: String,
    /// Request enhanced recognition mode.
    pub enhanced_mode: bool,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// API key (loaded from environment if not set).
    pub api_key: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            enhanced_mode: false,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

/// Timezone attached to standardized events, per writing-convention region.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimezoneConfig {
    /// Timezone name for US-region events.
    pub us: String,
    /// Timezone name for SE-region events.
    pub se: String,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            us: "America/New_York".to_string(),
            se: "Europe/Stockholm".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.dedup.enabled);
        assert_eq!(config.dedup.proximity_hours, 3);
        assert_eq!(config.review.confidence_threshold, 0.5);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [dedup]
            proximity_hours = 6

            [review]
            confidence_threshold = 0.7

            [timezone]
            se = "Europe/Malmo"
        "#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.dedup.proximity_hours, 6);
        assert_eq!(config.review.confidence_threshold, 0.7);
        assert_eq!(config.timezone.se, "Europe/Malmo");
        // Untouched sections keep defaults
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let toml = r#"
            [review]
            confidence_threshold = 1.5
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_ocr_requires_base_url() {
        let toml = r#"
            [ocr]
            enabled = true
        "#;
        assert!(Config::from_str(toml).is_err());
    }
}
