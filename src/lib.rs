//! EPUB/PDF 书库核心：上传保存、文本提取、书库索引

pub mod config;
pub mod error;
pub mod library;
pub mod metadata;
pub mod parser;
pub mod reader;
pub mod storage;

pub use config::LibraryConfig;
pub use error::{LibraryError, Partial, Result};
pub use library::{Library, LibraryEntry, StorageArea};
pub use metadata::resolve_title;
pub use parser::epub_parser::{extract_epub_chapters, EpubContainer, ItemKind, ItemSource};
pub use parser::pdf_parser::extract_pdf_text;
pub use parser::{BookContent, BookType, Chapter};
pub use reader::UploadReceipt;
pub use storage::{StoredBook, UploadHandler};

/// 列出书库中的所有书籍（每次调用都重新扫描）
pub fn list_library(config: &LibraryConfig) -> Vec<LibraryEntry> {
    Library::new(config).list()
}
