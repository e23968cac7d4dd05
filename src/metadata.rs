use std::path::Path;

use crate::error::Partial;
use crate::parser::epub_parser::EpubContainer;
use crate::parser::BookType;

/// 无法从路径得到任何名称时使用的标题
const UNKNOWN_TITLE: &str = "未知书籍";

/// 由文件名得到的默认标题：去掉最后一个扩展名
pub fn default_title(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// 解析书名
///
/// EPUB 优先使用 Dublin Core `title`，否则使用文件名。
/// PDF 不读取元数据，总是使用文件名。
/// 解析失败时记录日志并回退到文件名，结果总是非空
///
/// # 参数
/// - `path`: 书籍文件路径
/// - `book_type`: 书籍类型
pub fn resolve_title(path: &Path, book_type: BookType) -> Partial<String> {
    let fallback = default_title(path);

    match book_type {
        BookType::Epub => match EpubContainer::open(path) {
            Ok(container) => Partial::clean(container.title().unwrap_or(fallback)),
            Err(e) => {
                tracing::warn!("Error getting metadata: {}", e);
                Partial::degraded(fallback, e)
            }
        },
        // TODO: PDF 的 Info 字典里也可能有 Title，目前一律用文件名
        BookType::Pdf => Partial::clean(fallback),
    }
}
