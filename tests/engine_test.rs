use async_trait::async_trait;
use base64::Engine as _;
use docpress::core::engine::{OutputFormat, RenderEngine, RenderRequest};
use docpress::domain::model::PayloadNode;
use docpress::domain::ports::{DocFormat, DocumentConverter, TemplateEngine};
use docpress::utils::error::{PressError, Result};
use docpress::{BlockConverter, ContextTransformer, ConversionMode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// 假樣板引擎:把上下文樹的 JSON 接在樣板位元組後面。
/// 樣板內容是 FAIL 時模擬合併失敗
struct JsonTemplateEngine;

#[async_trait]
impl TemplateEngine for JsonTemplateEngine {
    async fn render(&self, template: &[u8], context: &PayloadNode) -> Result<Vec<u8>> {
        if template == b"FAIL" {
            return Err(PressError::TemplateError {
                message: "unresolved placeholder".to_string(),
            });
        }
        let mut bytes = template.to_vec();
        bytes.extend_from_slice(serde_json::to_string(&context.to_json())?.as_bytes());
        Ok(bytes)
    }
}

/// 原樣複製的假轉換器
struct CopyConverter;

#[async_trait]
impl DocumentConverter for CopyConverter {
    async fn convert(&self, input: &Path, target: DocFormat, output_dir: &Path) -> Result<PathBuf> {
        let data = tokio::fs::read(input).await?;
        let output = output_dir.join(format!("converted.{}", target.extension()));
        tokio::fs::write(&output, &data).await?;
        Ok(output)
    }
}

/// 永遠失敗的假轉換器
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
            message: "pipeline unavailable".to_string(),
        })
    }
}

fn engine_with<C: DocumentConverter>(
    dir: &TempDir,
    converter: C,
) -> RenderEngine<JsonTemplateEngine, C> {
    let block = BlockConverter::new(converter, dir.path(), Duration::from_secs(5));
    let transformer = ContextTransformer::new(block, ConversionMode::Block);
    RenderEngine::new(JsonTemplateEngine, transformer)
}

fn request(template: &[u8], data: serde_json::Value, format: &str) -> RenderRequest {
    RenderRequest::from_json(serde_json::json!({
        "template": base64::engine::general_purpose::STANDARD.encode(template),
        "data": data,
        "output_format": format,
    }))
    .unwrap()
}

#[tokio::test]
async fn test_render_docx_end_to_end() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(&dir, CopyConverter);

    let rendered = engine
        .run(request(
            b"PLANTILLA:",
            serde_json::json!({"nota": "<b>dato</b>", "nombre": "Ana"}),
            "docx",
        ))
        .await
        .unwrap();

    assert_eq!(rendered.format, OutputFormat::Docx);
    assert!(rendered.diagnostics.is_empty());

    let content = String::from_utf8_lossy(&rendered.bytes);
    assert!(content.starts_with("PLANTILLA:"));
    assert!(content.contains("fragment_id"));
    assert!(content.contains("\"nombre\":\"Ana\""));
}

#[tokio::test]
async fn test_render_pdf_runs_whole_document_conversion() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(&dir, CopyConverter);

    let rendered = engine
        .run(request(
            b"PLANTILLA:",
            serde_json::json!({"nombre": "Ana"}),
            "pdf",
        ))
        .await
        .unwrap();

    assert_eq!(rendered.format, OutputFormat::Pdf);
    // CopyConverter 原樣複製,PDF 位元組仍是合併後的內容
    let content = String::from_utf8_lossy(&rendered.bytes);
    assert!(content.starts_with("PLANTILLA:"));
}

#[tokio::test]
async fn test_template_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(&dir, CopyConverter);

    let result = engine
        .run(request(b"FAIL", serde_json::json!({"nombre": "Ana"}), "docx"))
        .await;

    assert!(matches!(result, Err(PressError::TemplateError { .. })));
}

#[tokio::test]
async fn test_degraded_leaves_surface_in_diagnostics() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(&dir, FailingConverter);

    let rendered = engine
        .run(request(
            b"PLANTILLA:",
            serde_json::json!({"nota": "<b>dato</b>", "nombre": "Ana"}),
            "docx",
        ))
        .await
        .unwrap();

    // 請求整體成功,退化的葉以原字串進入輸出並列入診斷
    assert_eq!(rendered.diagnostics.len(), 1);
    assert_eq!(rendered.diagnostics[0].path, "$.nota");
    let content = String::from_utf8_lossy(&rendered.bytes);
    assert!(content.contains("<b>dato</b>"));
}

#[tokio::test]
async fn test_payload_is_normalized_before_transform() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(&dir, CopyConverter);

    let rendered = engine
        .run(request(
            b"T:",
            serde_json::json!({"nombre": "  Ａｎａ "}),
            "docx",
        ))
        .await
        .unwrap();

    let content = String::from_utf8_lossy(&rendered.bytes);
    assert!(content.contains("\"nombre\":\"Ana\""));
}
