use crate::domain::model::ConversionMode;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PressError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    pub converter: ConverterConfig,
    pub transform: Option<TransformConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    pub command: String,
    pub scratch_dir: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str_content(&content)
    }

    pub fn from_str_content(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| PressError::ConfigError {
                message: format!("Invalid TOML config: {e}"),
            })?;
        config.validate()?;
        Ok(config)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("service.name", &self.service.name)?;
        validation::validate_path("service.output_path", &self.service.output_path)?;
        validation::validate_non_empty_string("converter.command", &self.converter.command)?;
        validation::validate_path("converter.scratch_dir", &self.converter.scratch_dir)?;
        if let Some(timeout) = self.converter.timeout_seconds {
            validation::validate_range("converter.timeout_seconds", timeout, 1, 600)?;
        }
        if let Some(transform) = &self.transform {
            if let Some(mode) = &transform.mode {
                validation::validate_one_of("transform.mode", mode, &["block", "inline"])?;
            }
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn converter_command(&self) -> &str {
        &self.converter.command
    }

    fn scratch_dir(&self) -> &str {
        &self.converter.scratch_dir
    }

    fn output_path(&self) -> &str {
        &self.service.output_path
    }

    fn timeout_seconds(&self) -> u64 {
        self.converter.timeout_seconds.unwrap_or(30)
    }

    fn conversion_mode(&self) -> ConversionMode {
        self.transform
            .as_ref()
            .and_then(|t| t.mode.as_deref())
            .and_then(|mode| ConversionMode::parse(mode).ok())
            .unwrap_or(ConversionMode::Block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[service]
name = "docpress"
output_path = "./output"

[converter]
command = "unoconv"
scratch_dir = "./scratch"
timeout_seconds = 45

[transform]
mode = "inline"

[monitoring]
enabled = true
log_level = "debug"
"#;

    #[test]
    fn test_load_full_config() {
        let config = TomlConfig::from_str_content(SAMPLE).unwrap();
        assert_eq!(config.converter_command(), "unoconv");
        assert_eq!(config.timeout_seconds(), 45);
        assert_eq!(config.conversion_mode(), ConversionMode::Inline);
        assert!(config.monitoring.unwrap().enabled);
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let minimal = r#"
[service]
name = "docpress"
output_path = "./output"

[converter]
command = "soffice"
scratch_dir = "/tmp/docpress"
"#;
        let config = TomlConfig::from_str_content(minimal).unwrap();
        assert_eq!(config.timeout_seconds(), 30);
        assert_eq!(config.conversion_mode(), ConversionMode::Block);
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        let bad = SAMPLE.replace("mode = \"inline\"", "mode = \"runs\"");
        assert!(TomlConfig::from_str_content(&bad).is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let result = TomlConfig::from_str_content("not toml at all [");
        assert!(matches!(result, Err(PressError::ConfigError { .. })));
    }
}
