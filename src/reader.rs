use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::library::Library;
use crate::metadata::resolve_title;
use crate::parser::epub_parser::{extract_epub_chapters, EpubContainer};
use crate::parser::{BookContent, BookType, Chapter, ParserRouter};
use crate::storage::{StoredBook, UploadHandler};

/// 上传回执
///
/// 只有 EPUB 会附带章节，PDF 交给前端的 PDF 阅读器显示
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub title: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub book_type: BookType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<Chapter>>,
}

/// 读取书库中的一本书
///
/// # 参数
/// - `library`: 书库
/// - `relative`: `<区域名>/<文件名>`
///
/// # 返回
/// EPUB 返回章节，PDF 返回全文；文件不存在或 EPUB 容器无法打开时返回错误
pub fn read(library: &Library, relative: &str) -> Result<BookContent> {
    let path = library.resolve(relative)?;
    let router = ParserRouter::new();
    let parsed = router.route(&path)?.parse(&path)?;

    if !parsed.is_clean() {
        tracing::info!("Read {} with {} extraction problems", relative, parsed.diagnostics.len());
    }

    Ok(parsed.into_value())
}

/// 接收上传：保存文件、解析书名，EPUB 同时提取章节
pub fn ingest(handler: &UploadHandler, filename: &str, bytes: &[u8]) -> Result<UploadReceipt> {
    receipt_for(handler.save(filename, bytes)?)
}

/// 从本地文件接收上传
pub fn ingest_file(handler: &UploadHandler, source: &Path) -> Result<UploadReceipt> {
    receipt_for(handler.save_file(source)?)
}

fn receipt_for(stored: StoredBook) -> Result<UploadReceipt> {
    let title = resolve_title(&stored.full_path, stored.book_type).into_value();

    let chapters = match stored.book_type {
        BookType::Epub => {
            let mut container = EpubContainer::open(&stored.full_path)?;
            Some(extract_epub_chapters(&mut container).into_value())
        }
        BookType::Pdf => None,
    };

    Ok(UploadReceipt {
        title,
        filename: stored.filename,
        book_type: stored.book_type,
        chapters,
    })
}
