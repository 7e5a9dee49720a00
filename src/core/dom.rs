use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// 解析標記片段,回傳 body 節點(html5ever 會自動補上文件外殼)。
/// 連同 `RcDom` 一起回傳:rcdom 的 `Drop` 會在文件根被釋放時遞迴清空整棵
/// 樹,所以呼叫端必須讓回傳的 `RcDom` 活得比 body handle 久。
pub(crate) fn parse_body(markup: &str) -> Option<(RcDom, Handle)> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut markup.as_bytes())
        .ok()?;
    let body = find_element(&dom.document, "body")?;
    Some((dom, body))
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { ref name, .. } = node.data {
        if name.local.as_ref().eq_ignore_ascii_case(tag) {
            return Some(node.clone());
        }
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

pub(crate) fn element_name(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref().to_ascii_lowercase()),
        _ => None,
    }
}

pub(crate) fn attr_value(node: &Handle, attr_name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = node.data {
        for attr in attrs.borrow().iter() {
            if attr.name.local.as_ref().eq_ignore_ascii_case(attr_name) {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

/// 展平節點下的全部文字內容
pub(crate) fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}
