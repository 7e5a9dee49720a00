use crate::utils::error::{PressError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 請求資料樹。輸入輸出共用同一結構,僅標記字串葉可能變成 Rich
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadNode {
    Scalar(ScalarValue),
    Rich(RichContent),
    Mapping(IndexMap<String, PayloadNode>),
    Sequence(Vec<PayloadNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
}

/// 標記葉轉換後的富內容:行內 run 序列或不透明的區塊片段
#[derive(Debug, Clone, PartialEq)]
pub enum RichContent {
    InlineRuns(Vec<Run>),
    BlockFragment(BlockFragment),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

/// 外部管線產出的原生文件片段;位元組內容對核心不透明,
/// 由樣板引擎在嵌入時接手
#[derive(Debug, Clone, PartialEq)]
pub struct BlockFragment {
    id: String,
    bytes: Vec<u8>,
}

impl BlockFragment {
    pub fn new(id: String, bytes: Vec<u8>) -> Self {
        Self { id, bytes }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// 單葉轉換結果,退化必須顯式呈現而非靜默吞掉
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted(RichContent),
    Unchanged { reason: String },
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    Block,
    Inline,
}

impl ConversionMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "block" => Ok(Self::Block),
            "inline" => Ok(Self::Inline),
            other => Err(PressError::InvalidConfigValueError {
                field: "mode".to_string(),
                value: other.to_string(),
                reason: "Allowed values: block, inline".to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Inline => "inline",
        }
    }
}

/// 單葉退化的診斷記錄
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub path: String,
    pub detail: String,
}

impl PayloadNode {
    /// 從解碼後的 JSON 建樹;完全函數,任何 Value 都有對應
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Scalar(ScalarValue::Null),
            Value::Bool(b) => Self::Scalar(ScalarValue::Bool(b)),
            Value::Number(n) => Self::Scalar(ScalarValue::Number(n)),
            Value::String(s) => Self::Scalar(ScalarValue::Text(s)),
            Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from_json).collect())
            }
            Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// 轉回 JSON 供驅動程式與測試檢視;Rich 葉以描述性物件呈現
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(ScalarValue::Text(s)) => Value::String(s.clone()),
            Self::Scalar(ScalarValue::Number(n)) => Value::Number(n.clone()),
            Self::Scalar(ScalarValue::Bool(b)) => Value::Bool(*b),
            Self::Scalar(ScalarValue::Null) => Value::Null,
            Self::Rich(RichContent::InlineRuns(runs)) => serde_json::json!({ "runs": runs }),
            Self::Rich(RichContent::BlockFragment(fragment)) => serde_json::json!({
                "fragment_id": fragment.id(),
                "fragment_len": fragment.bytes().len(),
            }),
            Self::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Sequence(items) => {
                Value::Array(items.iter().map(PayloadNode::to_json).collect())
            }
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(ScalarValue::Text(value.into()))
    }
}
