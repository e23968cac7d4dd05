use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{LibraryError, Partial, Result};

// 子模块声明
pub mod epub_parser;
pub mod html_text;
pub mod pdf_parser;

/// 书籍类型
///
/// 由文件扩展名决定（区分大小写，只接受 `.epub` 和 `.pdf`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookType {
    Epub,
    Pdf,
}

impl BookType {
    /// 所有支持的类型，按书库扫描顺序排列
    pub const ALL: [BookType; 2] = [BookType::Epub, BookType::Pdf];

    pub fn extension(self) -> &'static str {
        match self {
            BookType::Epub => "epub",
            BookType::Pdf => "pdf",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.extension() == ext)
    }

    /// 根据文件路径判断书籍类型，不识别时返回 None
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// 章节数据
///
/// `title` 是条目在容器内的名称，并不是真正的章节标题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    /// 规范化后的纯文本
    pub content: String,
}

/// 一本书的可读内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookContent {
    Epub { chapters: Vec<Chapter> },
    Pdf { text: String },
}

/// Parser trait
///
/// 所有格式解析器必须实现此 trait
pub trait Parser: Send + Sync {
    /// 解析文件
    ///
    /// # 参数
    /// - `file_path`: 要解析的文件路径
    ///
    /// # 返回
    /// 无法打开容器时返回错误；单个条目或页面的失败只记录在 [`Partial`] 中
    fn parse(&self, file_path: &Path) -> Result<Partial<BookContent>>;

    /// 解析器对应的书籍类型
    fn book_type(&self) -> BookType;

    /// 获取支持的文件扩展名列表
    fn supported_extensions(&self) -> Vec<&str>;
}

/// Parser 路由器
///
/// 根据文件扩展名路由到对应的解析器
pub struct ParserRouter {
    /// 扩展名到解析器的映射
    parsers: HashMap<String, Box<dyn Parser>>,
}

impl ParserRouter {
    /// 创建新的路由器实例
    ///
    /// 注册所有可用的解析器
    pub fn new() -> Self {
        let mut parsers: HashMap<String, Box<dyn Parser>> = HashMap::new();

        // 注册 EPUB 解析器
        let epub = Box::new(epub_parser::EpubParser::new());
        for ext in epub.supported_extensions() {
            parsers.insert(ext.to_string(), epub.clone());
        }

        // 注册 PDF 解析器
        let pdf = Box::new(pdf_parser::PdfParser::new());
        for ext in pdf.supported_extensions() {
            parsers.insert(ext.to_string(), pdf.clone());
        }

        Self { parsers }
    }

    /// 根据文件路径路由到对应的解析器
    ///
    /// 扩展名区分大小写：`book.EPUB` 不被支持
    pub fn route(&self, file_path: &Path) -> Result<&dyn Parser> {
        let unsupported = || LibraryError::UnsupportedFormat(file_path.display().to_string());

        let ext = file_path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(unsupported)?;

        self.parsers
            .get(ext)
            .map(|p| p.as_ref())
            .ok_or_else(unsupported)
    }

    /// 获取所有支持的文件扩展名
    pub fn supported_extensions(&self) -> Vec<String> {
        self.parsers.keys().cloned().collect()
    }

    /// 检查是否支持指定的文件扩展名
    pub fn supports(&self, extension: &str) -> bool {
        self.parsers.contains_key(extension)
    }
}

impl Default for ParserRouter {
    fn default() -> Self {
        Self::new()
    }
}
