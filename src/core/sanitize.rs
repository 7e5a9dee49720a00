use crate::core::dom::{self, parse_body};
use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;
use std::sync::LazyLock;

// class 屬性命中此樣式的容器視為編輯器外殼,整個展開只留內容
static WRAPPER_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)(?:ql-editor|ql-container|mce-content-body|editor-content)(?:\s|$)")
        .expect("wrapper class pattern is valid")
});

// 空元素刪除規則的保護名單:換行與圖片本身就是內容
const PROTECTED_EMPTY: [&str; 2] = ["br", "img"];
const VOID_ELEMENTS: [&str; 3] = ["br", "img", "hr"];
const STRIPPED_ATTRS: [&str; 2] = ["style", "dir"];
const TABLE_CELLS: [&str; 2] = ["td", "th"];

/// 把標記字串重寫成樣板安全的受限形式。盡力而為:
/// 任何解析異常都吞下並回傳原字串,絕不向外拋錯
pub fn sanitize(markup: &str) -> String {
    let decoded = html_escape::decode_html_entities(markup);

    let Some((_dom, body)) = parse_body(&decoded) else {
        tracing::warn!("Markup could not be parsed, keeping original string");
        return markup.to_string();
    };

    let mut out = String::with_capacity(markup.len());
    for child in body.children.borrow().iter() {
        emit_node(child, false, &mut out);
    }
    out
}

fn emit_node(node: &Handle, in_cell: bool, out: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => {
            out.push_str(&html_escape::encode_text(&**contents.borrow()));
        }
        NodeData::Element { .. } => emit_element(node, in_cell, out),
        // 註解、doctype 等一律丟棄
        _ => {}
    }
}

fn emit_element(node: &Handle, in_cell: bool, out: &mut String) {
    let name = dom::element_name(node).unwrap_or_default();

    // 編輯器外殼容器:展開
    if let Some(class) = dom::attr_value(node, "class") {
        if WRAPPER_CLASS.is_match(&class) {
            emit_children(node, in_cell, out);
            return;
        }
    }

    // tbody 包裝:展開
    if name == "tbody" {
        emit_children(node, in_cell, out);
        return;
    }

    // 儲存格內的段落:展平
    if in_cell && name == "p" {
        emit_children(node, in_cell, out);
        return;
    }

    let attrs = kept_attrs(node);

    // 去掉 style/dir 後再無屬性的 span:展開
    if name == "span" && attrs.is_empty() {
        emit_children(node, in_cell, out);
        return;
    }

    // 無屬性且無非空白文字的元素:刪除(保護名單與含保護後代者除外)
    if attrs.is_empty()
        && !PROTECTED_EMPTY.contains(&name.as_str())
        && dom::text_content(node).trim().is_empty()
        && !has_protected_descendant(node)
    {
        return;
    }

    out.push('<');
    out.push_str(&name);
    for (attr_name, attr_value) in &attrs {
        out.push(' ');
        out.push_str(attr_name);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(attr_value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name.as_str()) {
        return;
    }

    let child_in_cell = in_cell || TABLE_CELLS.contains(&name.as_str());
    emit_children(node, child_in_cell, out);

    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

fn emit_children(node: &Handle, in_cell: bool, out: &mut String) {
    for child in node.children.borrow().iter() {
        emit_node(child, in_cell, out);
    }
}

/// 元素屬性去掉 style/dir 之後的剩餘集合
fn kept_attrs(node: &Handle) -> Vec<(String, String)> {
    let NodeData::Element { ref attrs, .. } = node.data else {
        return Vec::new();
    };
    attrs
        .borrow()
        .iter()
        .filter(|attr| {
            let local = attr.name.local.as_ref().to_ascii_lowercase();
            !STRIPPED_ATTRS.contains(&local.as_str())
        })
        .map(|attr| {
            (
                attr.name.local.as_ref().to_ascii_lowercase(),
                attr.value.to_string(),
            )
        })
        .collect()
}

fn has_protected_descendant(node: &Handle) -> bool {
    for child in node.children.borrow().iter() {
        if let Some(name) = dom::element_name(child) {
            if PROTECTED_EMPTY.contains(&name.as_str()) || has_protected_descendant(child) {
                return true;
            }
        }
    }
    false
}
