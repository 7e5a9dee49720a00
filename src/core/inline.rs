use crate::core::dom::{self, parse_body};
use crate::domain::model::Run;
use markup5ever_rcdom::{Handle, NodeData};

const INDENT_STEP: usize = 4;
const BULLET: &str = "• ";

/// 封閉的元素種類列舉,取代按標籤名的開放分派
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Bold,
    Italic,
    OrderedList,
    UnorderedList,
    ListItem,
    Container,
}

impl ElementKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "b" | "strong" => Self::Bold,
            "i" | "em" => Self::Italic,
            "ol" => Self::OrderedList,
            "ul" => Self::UnorderedList,
            "li" => Self::ListItem,
            _ => Self::Container,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Style {
    bold: bool,
    italic: bool,
}

/// 把消毒過的標記轉成依文件順序排列的 run 序列。
/// 用於把格式化文字就地接進段落,而非插入結構區塊
pub fn to_runs(markup: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    if let Some((_dom, body)) = parse_body(markup) {
        for child in body.children.borrow().iter() {
            walk(child, Style::default(), 0, &mut runs);
        }
    }
    runs
}

fn walk(node: &Handle, style: Style, indent: usize, runs: &mut Vec<Run>) {
    match node.data {
        NodeData::Text { ref contents } => {
            let text = contents.borrow();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                runs.push(Run {
                    text: trimmed.to_string(),
                    bold: style.bold,
                    italic: style.italic,
                });
            }
        }
        NodeData::Element { .. } => {
            let tag = dom::element_name(node).unwrap_or_default();
            match ElementKind::from_tag(&tag) {
                ElementKind::Bold => push_flattened(node, Style { bold: true, ..style }, runs),
                ElementKind::Italic => {
                    push_flattened(node, Style { italic: true, ..style }, runs)
                }
                ElementKind::OrderedList => walk_list(node, indent, true, runs),
                ElementKind::UnorderedList => walk_list(node, indent, false, runs),
                // 游離的 li(不在清單下)與其他元素一樣透明遞迴
                ElementKind::ListItem | ElementKind::Container => {
                    for child in node.children.borrow().iter() {
                        walk(child, style, indent, runs);
                    }
                }
            }
        }
        _ => {}
    }
}

/// 粗體/斜體元素的文字整個展平成單一 run
fn push_flattened(node: &Handle, style: Style, runs: &mut Vec<Run>) {
    let text = dom::text_content(node);
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        runs.push(Run {
            text: trimmed.to_string(),
            bold: style.bold,
            italic: style.italic,
        });
    }
}

fn walk_list(node: &Handle, indent: usize, ordered: bool, runs: &mut Vec<Run>) {
    let mut position = 0usize;
    // 只迭代直接的 li 子節點
    for item in node.children.borrow().iter() {
        if dom::element_name(item).as_deref() != Some("li") {
            continue;
        }
        position += 1;

        let bullet = if ordered {
            format!("{}. ", position)
        } else {
            BULLET.to_string()
        };
        let prefix = format!("\n{}{}", " ".repeat(indent), bullet);

        let first = runs.len();
        for child in item.children.borrow().iter() {
            walk(child, Style::default(), indent + INDENT_STEP, runs);
        }

        // 項目前綴(換行+縮排+符號)併入該項目的第一個 run
        if runs.len() > first {
            runs[first].text = format!("{}{}", prefix, runs[first].text);
        } else {
            runs.push(Run {
                text: prefix,
                bold: false,
                italic: false,
            });
        }
    }
}
