use crate::core::block::BlockConverter;
use crate::core::detect::is_markup;
use crate::core::inline::to_runs;
use crate::core::sanitize::sanitize;
use crate::domain::model::{
    ConversionMode, ConversionOutcome, Diagnostic, PayloadNode, RichContent, ScalarValue,
};
use crate::domain::ports::DocumentConverter;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use uuid::Uuid;

/// 請求範圍的上下文:請求 ID、起始時間與診斷收集器。
/// 顯式傳遞,取代程序層級的可變狀態
#[derive(Debug)]
pub struct RequestContext {
    pub request_id: String,
    pub started_at: DateTime<Utc>,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    pub fn record(&self, path: &str, detail: impl Into<String>) {
        // 診斷屬盡力而為,lock 毒化時直接放棄該筆
        if let Ok(mut sink) = self.diagnostics.lock() {
            sink.push(Diagnostic {
                path: path.to_string(),
                detail: detail.into(),
            });
        }
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|sink| sink.clone())
            .unwrap_or_default()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 上下文樹轉換器:遞迴改寫 payload 樹,把標記葉換成富內容。
/// 單葉失敗絕不中斷整棵樹,這是本設計的核心取捨
pub struct ContextTransformer<C: DocumentConverter> {
    block: BlockConverter<C>,
    mode: ConversionMode,
}

impl<C: DocumentConverter> ContextTransformer<C> {
    pub fn new(block: BlockConverter<C>, mode: ConversionMode) -> Self {
        Self { block, mode }
    }

    pub fn block(&self) -> &BlockConverter<C> {
        &self.block
    }

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    /// 轉換整棵樹。永不失敗:回傳的樹與輸入結構一致,必要處退化
    pub async fn transform(&self, tree: PayloadNode, context: &RequestContext) -> PayloadNode {
        self.transform_node(tree, String::from("$"), context).await
    }

    fn transform_node<'a>(
        &'a self,
        node: PayloadNode,
        path: String,
        context: &'a RequestContext,
    ) -> Pin<Box<dyn Future<Output = PayloadNode> + Send + 'a>> {
        Box::pin(async move {
            match node {
                PayloadNode::Mapping(map) => {
                    // 鍵與順序原樣重建
                    let mut rebuilt = IndexMap::with_capacity(map.len());
                    for (key, value) in map {
                        let child_path = format!("{path}.{key}");
                        let transformed = self.transform_node(value, child_path, context).await;
                        rebuilt.insert(key, transformed);
                    }
                    PayloadNode::Mapping(rebuilt)
                }
                PayloadNode::Sequence(items) => {
                    let mut rebuilt = Vec::with_capacity(items.len());
                    for (index, item) in items.into_iter().enumerate() {
                        let child_path = format!("{path}[{index}]");
                        rebuilt.push(self.transform_node(item, child_path, context).await);
                    }
                    PayloadNode::Sequence(rebuilt)
                }
                PayloadNode::Scalar(ScalarValue::Text(text)) => {
                    match self.convert_leaf(&text, &path, context).await {
                        ConversionOutcome::Converted(content) => PayloadNode::Rich(content),
                        // 退化與略過都保留原字串(未消毒的原值)
                        ConversionOutcome::Unchanged { .. } | ConversionOutcome::Skipped => {
                            PayloadNode::Scalar(ScalarValue::Text(text))
                        }
                    }
                }
                other => other,
            }
        })
    }

    /// 單葉轉換:偵測 → 消毒 → 依模式轉換,結果顯式回報
    pub async fn convert_leaf(
        &self,
        text: &str,
        path: &str,
        context: &RequestContext,
    ) -> ConversionOutcome {
        if !is_markup(text) {
            return ConversionOutcome::Skipped;
        }

        let cleaned = sanitize(text);
        match self.mode {
            ConversionMode::Inline => {
                ConversionOutcome::Converted(RichContent::InlineRuns(to_runs(&cleaned)))
            }
            ConversionMode::Block => match self.block.to_block(&cleaned).await {
                Ok(fragment) => {
                    ConversionOutcome::Converted(RichContent::BlockFragment(fragment))
                }
                Err(error) => {
                    tracing::warn!(
                        "🔶 Conversion failed at {} for value {:?}: {} (keeping original value)",
                        path,
                        truncate_for_log(text),
                        error
                    );
                    context.record(path, error.to_string());
                    ConversionOutcome::Unchanged {
                        reason: error.to_string(),
                    }
                }
            },
        }
    }
}

/// 日誌裡的失敗值只留前段,避免整份標記灌進日誌
fn truncate_for_log(text: &str) -> &str {
    let mut end = text.len().min(120);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
