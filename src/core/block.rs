use crate::domain::model::BlockFragment;
use crate::domain::ports::{DocFormat, DocumentConverter};
use crate::utils::error::{PressError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// 單次轉換的暫存槽。目錄名含 uuid,並發請求間絕不共用;
/// 離開作用域即釋放,成功失敗皆然
pub(crate) struct ScratchSlot {
    dir: tempfile::TempDir,
    id: String,
}

impl ScratchSlot {
    pub(crate) fn create(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        let id = Uuid::new_v4().to_string();
        let dir = tempfile::Builder::new()
            .prefix(&format!("docpress-{id}-"))
            .tempdir_in(root)?;
        Ok(Self { dir, id })
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub struct BlockConverter<C: DocumentConverter> {
    converter: C,
    scratch_root: PathBuf,
    timeout: Duration,
}

impl<C: DocumentConverter> BlockConverter<C> {
    pub fn new(converter: C, scratch_root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            converter,
            scratch_root: scratch_root.into(),
            timeout,
        }
    }

    /// 兩段式轉換:標記 → 中繼 ODT → 原生 DOCX 片段。
    /// 回傳的片段握有位元組,暫存槽在回傳前釋放
    pub async fn to_block(&self, markup: &str) -> Result<BlockFragment> {
        let slot = ScratchSlot::create(&self.scratch_root)?;
        let source = slot.file("fragment.html");
        tokio::fs::write(&source, markup).await?;

        let intermediate = self
            .convert_bounded(&source, DocFormat::Odt, slot.path())
            .await?;
        let native = self
            .convert_bounded(&intermediate, DocFormat::Docx, slot.path())
            .await?;

        let bytes = tokio::fs::read(&native).await?;
        tracing::debug!("Converted fragment {} ({} bytes)", slot.id(), bytes.len());
        Ok(BlockFragment::new(slot.id().to_string(), bytes))
    }

    /// 整份文件轉指定格式(例如最終 PDF 輸出)
    pub async fn document_to(
        &self,
        document: &[u8],
        source_ext: &str,
        target: DocFormat,
    ) -> Result<Vec<u8>> {
        let slot = ScratchSlot::create(&self.scratch_root)?;
        let source = slot.file(&format!("document.{source_ext}"));
        tokio::fs::write(&source, document).await?;

        let converted = self.convert_bounded(&source, target, slot.path()).await?;
        Ok(tokio::fs::read(&converted).await?)
    }

    /// 外部轉換呼叫一律以逾時包住,逾時視同轉換失敗而非掛住請求
    async fn convert_bounded(
        &self,
        input: &Path,
        target: DocFormat,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        match tokio::time::timeout(self.timeout, self.converter.convert(input, target, output_dir))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(PressError::ConversionError {
                message: format!(
                    "converter timed out after {:?} while producing {}",
                    self.timeout,
                    target.extension()
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// 把輸入原封複製成目標格式的假轉換器
    struct CopyConverter;

    #[async_trait]
    impl DocumentConverter for CopyConverter {
        async fn convert(
            &self,
            input: &Path,
            target: DocFormat,
            output_dir: &Path,
        ) -> Result<PathBuf> {
            let data = tokio::fs::read(input).await?;
            let output = output_dir.join(format!("converted.{}", target.extension()));
            tokio::fs::write(&output, &data).await?;
            Ok(output)
        }
    }

    /// 永遠卡住的轉換器,用來驗證逾時路徑
    struct StallingConverter;

    #[async_trait]
    impl DocumentConverter for StallingConverter {
        async fn convert(
            &self,
            _input: &Path,
            _target: DocFormat,
            _output_dir: &Path,
        ) -> Result<PathBuf> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("sleep outlives every test timeout")
        }
    }

    #[tokio::test]
    async fn test_to_block_round_trips_markup_bytes() {
        let root = tempfile::TempDir::new().unwrap();
        let converter = BlockConverter::new(CopyConverter, root.path(), Duration::from_secs(5));

        let fragment = converter.to_block("<p>nota</p>").await.unwrap();
        assert_eq!(fragment.bytes(), b"<p>nota</p>");
        assert!(!fragment.id().is_empty());
    }

    #[tokio::test]
    async fn test_scratch_slots_are_unique_and_released() {
        let root = tempfile::TempDir::new().unwrap();
        let converter = BlockConverter::new(CopyConverter, root.path(), Duration::from_secs(5));

        let first = converter.to_block("<p>uno</p>").await.unwrap();
        let second = converter.to_block("<p>dos</p>").await.unwrap();
        assert_ne!(first.id(), second.id());

        // 兩次呼叫結束後暫存根目錄必須是空的
        let leftover = std::fs::read_dir(root.path()).unwrap().count();
        assert_eq!(leftover, 0);
    }

    #[tokio::test]
    async fn test_scratch_released_on_failure() {
        struct FailingConverter;

        #[async_trait]
        impl DocumentConverter for FailingConverter {
            async fn convert(
                &self,
                _input: &Path,
                _target: DocFormat,
                _output_dir: &Path,
            ) -> Result<PathBuf> {
                Err(PressError::ConversionError {
                    message: "simulated converter failure".to_string(),
                })
            }
        }

        let root = tempfile::TempDir::new().unwrap();
        let converter = BlockConverter::new(FailingConverter, root.path(), Duration::from_secs(5));

        assert!(converter.to_block("<p>x</p>").await.is_err());
        let leftover = std::fs::read_dir(root.path()).unwrap().count();
        assert_eq!(leftover, 0);
    }

    #[tokio::test]
    async fn test_timeout_becomes_conversion_error() {
        let root = tempfile::TempDir::new().unwrap();
        let converter =
            BlockConverter::new(StallingConverter, root.path(), Duration::from_millis(50));

        let result = converter.to_block("<p>x</p>").await;
        match result {
            Err(PressError::ConversionError { message }) => {
                assert!(message.contains("timed out"));
            }
            other => panic!("expected timeout conversion error, got {:?}", other.map(|f| f.id().to_string())),
        }
    }

    #[tokio::test]
    async fn test_document_to_converts_whole_document() {
        let root = tempfile::TempDir::new().unwrap();
        let converter = BlockConverter::new(CopyConverter, root.path(), Duration::from_secs(5));

        let bytes = converter
            .document_to(b"rendered docx", "docx", DocFormat::Pdf)
            .await
            .unwrap();
        assert_eq!(bytes, b"rendered docx");
    }
}
