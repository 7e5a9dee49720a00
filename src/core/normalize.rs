use crate::domain::model::{PayloadNode, ScalarValue};
use unicode_normalization::UnicodeNormalization;

/// Unicode 相容性正規化 (NFKC) 加頭尾去空白。純函數,永不失敗
pub fn normalize_text(text: &str) -> String {
    text.nfkc().collect::<String>().trim().to_string()
}

/// 對整棵樹的每個文字葉做正規化。必須在標記偵測前執行,
/// 正規化可能改變字串是否仍像標記
pub fn normalize_tree(node: PayloadNode) -> PayloadNode {
    match node {
        PayloadNode::Scalar(ScalarValue::Text(text)) => {
            PayloadNode::Scalar(ScalarValue::Text(normalize_text(&text)))
        }
        PayloadNode::Mapping(map) => PayloadNode::Mapping(
            map.into_iter()
                .map(|(key, value)| (key, normalize_tree(value)))
                .collect(),
        ),
        PayloadNode::Sequence(items) => {
            PayloadNode::Sequence(items.into_iter().map(normalize_tree).collect())
        }
        other => other,
    }
}
