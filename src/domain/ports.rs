use crate::domain::model::{ConversionMode, PayloadNode};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Odt,
    Docx,
    Pdf,
}

impl DocFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Odt => "odt",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }
}

/// 外部文件轉換器。回傳碼區分成敗,失敗時帶回工具的診斷文字
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, input: &Path, target: DocFormat, output_dir: &Path)
        -> Result<PathBuf>;
}

/// 外部樣板引擎。合併失敗對整個請求是致命的
#[async_trait]
pub trait TemplateEngine: Send + Sync {
    async fn render(&self, template: &[u8], context: &PayloadNode) -> Result<Vec<u8>>;
}

pub trait ConfigProvider: Send + Sync {
    fn converter_command(&self) -> &str;
    fn scratch_dir(&self) -> &str;
    fn output_path(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn conversion_mode(&self) -> ConversionMode;
}
