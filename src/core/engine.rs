use crate::core::normalize::normalize_tree;
use crate::core::walker::{ContextTransformer, RequestContext};
use crate::domain::model::{Diagnostic, PayloadNode};
use crate::domain::ports::{DocFormat, DocumentConverter, TemplateEngine};
use crate::utils::error::{PressError, Result};
use base64::Engine as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Docx,
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }
}

/// 一次產生文件的請求:樣板位元組、資料樹與輸出格式
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub template: Vec<u8>,
    pub data: serde_json::Value,
    pub output_format: OutputFormat,
}

impl RenderRequest {
    /// 解析服務的線上請求格式:
    /// {"template": <base64 docx>, "data": {...}, "output_format": "docx"|"pdf"}
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let template_b64 = value
            .get("template")
            .and_then(|v| v.as_str())
            .ok_or_else(|| PressError::InvalidRequestError {
                message: "missing 'template' field".to_string(),
            })?;
        let template = base64::engine::general_purpose::STANDARD
            .decode(template_b64)
            .map_err(|e| PressError::InvalidRequestError {
                message: format!("'template' is not valid base64: {e}"),
            })?;

        let data = value
            .get("data")
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

        let output_format = match value
            .get("output_format")
            .and_then(|v| v.as_str())
            .unwrap_or("docx")
        {
            "docx" => OutputFormat::Docx,
            "pdf" => OutputFormat::Pdf,
            other => {
                return Err(PressError::InvalidRequestError {
                    message: format!("unsupported output format: {other}"),
                })
            }
        };

        Ok(Self {
            template,
            data,
            output_format,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub diagnostics: Vec<Diagnostic>,
}

/// 請求的完整流程:正規化 → 樹轉換 → 樣板合併 → 可選的整檔轉 PDF。
/// 樣板合併失敗對請求是致命的;葉級失敗早在轉換階段就地退化
pub struct RenderEngine<T: TemplateEngine, C: DocumentConverter> {
    template_engine: T,
    transformer: ContextTransformer<C>,
}

impl<T: TemplateEngine, C: DocumentConverter> RenderEngine<T, C> {
    pub fn new(template_engine: T, transformer: ContextTransformer<C>) -> Self {
        Self {
            template_engine,
            transformer,
        }
    }

    pub async fn run(&self, request: RenderRequest) -> Result<RenderedDocument> {
        let context = RequestContext::new();
        tracing::info!(
            "📥 Request {}: template {} bytes, output {}",
            context.request_id,
            request.template.len(),
            request.output_format.extension()
        );

        let tree = normalize_tree(PayloadNode::from_json(request.data));
        let tree = self.transformer.transform(tree, &context).await;

        let diagnostics = context.diagnostics();
        if diagnostics.is_empty() {
            tracing::info!("🔄 Request {}: context tree transformed", context.request_id);
        } else {
            tracing::warn!(
                "🔶 Request {}: {} leaves kept as raw text",
                context.request_id,
                diagnostics.len()
            );
        }

        let document = self.template_engine.render(&request.template, &tree).await?;
        tracing::info!(
            "💾 Request {}: template merged ({} bytes)",
            context.request_id,
            document.len()
        );

        let bytes = match request.output_format {
            OutputFormat::Docx => document,
            OutputFormat::Pdf => {
                self.transformer
                    .block()
                    .document_to(&document, "docx", DocFormat::Pdf)
                    .await?
            }
        };

        Ok(RenderedDocument {
            bytes,
            format: request.output_format,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn test_request_from_json_defaults_to_docx() {
        let template = base64::engine::general_purpose::STANDARD.encode(b"plantilla");
        let request = RenderRequest::from_json(serde_json::json!({
            "template": template,
            "data": {"nombre": "Ana"}
        }))
        .unwrap();

        assert_eq!(request.template, b"plantilla");
        assert_eq!(request.output_format, OutputFormat::Docx);
        assert_eq!(request.data["nombre"], "Ana");
    }

    #[test]
    fn test_request_from_json_rejects_bad_input() {
        assert!(RenderRequest::from_json(serde_json::json!({})).is_err());
        assert!(RenderRequest::from_json(serde_json::json!({
            "template": "no-es-base64!!!"
        }))
        .is_err());

        let template = base64::engine::general_purpose::STANDARD.encode(b"x");
        assert!(RenderRequest::from_json(serde_json::json!({
            "template": template,
            "output_format": "html"
        }))
        .is_err());
    }

    #[test]
    fn test_request_from_json_accepts_pdf() {
        let template = base64::engine::general_purpose::STANDARD.encode(b"x");
        let request = RenderRequest::from_json(serde_json::json!({
            "template": template,
            "output_format": "pdf"
        }))
        .unwrap();
        assert_eq!(request.output_format, OutputFormat::Pdf);
        // data 缺省時是空物件
        assert!(request.data.as_object().unwrap().is_empty());
    }
}
