use crate::domain::ports::{DocFormat, DocumentConverter};
use crate::utils::error::{PressError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// 透過 unoconv 風格的命令列工具做格式轉換:
/// `<程式> -f <格式> -o <輸出> <輸入>`
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl DocumentConverter for CommandConverter {
    async fn convert(
        &self,
        input: &Path,
        target: DocFormat,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("converted");
        let output = output_dir.join(format!("{}.{}", stem, target.extension()));

        tracing::debug!(
            "Running {} -f {} -o {} {}",
            self.program,
            target.extension(),
            output.display(),
            input.display()
        );

        // kill_on_drop:請求被中止時不留下孤兒轉換程序
        let result = Command::new(&self.program)
            .arg("-f")
            .arg(target.extension())
            .arg("-o")
            .arg(&output)
            .arg(input)
            .kill_on_drop(true)
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            tracing::error!("❌ Converter exited with {}: {}", result.status, stderr);
            return Err(PressError::ConversionError {
                message: format!("{} failed: {}", self.program, stderr.trim()),
            });
        }

        if !output.exists() {
            return Err(PressError::ConversionError {
                message: format!(
                    "{} reported success but produced no output at {}",
                    self.program,
                    output.display()
                ),
            });
        }

        Ok(output)
    }
}
