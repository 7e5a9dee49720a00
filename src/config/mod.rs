pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::ConversionMode;
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "docpress")]
#[command(about = "Merges nested data payloads into document templates")]
pub struct CliConfig {
    /// 輸入 payload(JSON 檔)
    #[arg(long)]
    pub payload: String,

    /// 選擇性的 TOML 配置檔,提供時覆蓋其餘轉換參數
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, default_value = "unoconv")]
    pub converter_command: String,

    #[arg(long, default_value = "./scratch")]
    pub scratch_dir: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    /// 標記葉的轉換模式:block 或 inline
    #[arg(long, default_value = "block")]
    pub mode: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("payload", &self.payload)?;
        validation::validate_non_empty_string("converter_command", &self.converter_command)?;
        validation::validate_path("scratch_dir", &self.scratch_dir)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        validation::validate_one_of("mode", &self.mode, &["block", "inline"])?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn converter_command(&self) -> &str {
        &self.converter_command
    }

    fn scratch_dir(&self) -> &str {
        &self.scratch_dir
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn conversion_mode(&self) -> ConversionMode {
        // validate() 先擋掉非法值,這裡退回預設只是保險
        ConversionMode::parse(&self.mode).unwrap_or(ConversionMode::Block)
    }
}
