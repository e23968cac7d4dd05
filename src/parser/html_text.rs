use scraper::{ElementRef, Html};

/// 不可见内容所在的标签，整棵子树都跳过
const HIDDEN_TAGS: &[&str] = &["head", "script", "style", "template"];

/// 块级标签：前后补一个空格，避免相邻段落的文字粘在一起
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th",
    "tr", "ul",
];

/// 把 HTML/XHTML 片段转换为规范化的纯文本
///
/// 去掉所有标签，连续空白（含换行）折叠为单个空格并去掉首尾空白。
/// 解析器对残缺的标记是宽容的，永远不会失败
pub fn normalize(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let mut text = String::new();
    collect_visible_text(&document.root_element(), &mut text);
    collapse_whitespace(&text)
}

/// 折叠空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 递归收集可见文本
fn collect_visible_text(element: &ElementRef, out: &mut String) {
    let tag_name = element.value().name();
    if HIDDEN_TAGS.contains(&tag_name) {
        return;
    }

    let is_block = BLOCK_TAGS.contains(&tag_name);
    if is_block {
        out.push(' ');
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            collect_visible_text(&child_element, out);
        }
    }

    if is_block {
        out.push(' ');
    }
}
