use regex::Regex;
use std::sync::LazyLock;

// 通用標籤樣式:< 後接字母或斜線,一路到 >。
// "<3" 這類字面文字不會命中;帶角括號的一般文字仍可能誤判,屬已知且接受的限制
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("tag pattern is valid"));

/// 判斷字串葉是否含標記。純函數,永不失敗
pub fn is_markup(text: &str) -> bool {
    TAG_PATTERN.is_match(text)
}
