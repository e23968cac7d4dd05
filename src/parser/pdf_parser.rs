use super::*;
use pdf_extract::{Document, PlainTextOutput};
use std::fs;
use std::panic::{self, AssertUnwindSafe};

/// 页面之间的分隔符
const PAGE_SEPARATOR: &str = " ";

/// 提取 PDF 文本（尽力而为）
///
/// 逐页提取文本（去掉首尾空白）并以单个空格连接。读取或解析失败时记录日志，不会把错误抛给调用方：
/// 文档整体无法打开时返回空字符串；某一页失败时返回此前各页已经累积的文本。
/// 两种情况都附带诊断信息
pub fn extract_pdf_text(file_path: &Path) -> Partial<String> {
    // 一次性读完，文件句柄在这里就释放了
    let bytes = match fs::read(file_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Error reading PDF {}: {}", file_path.display(), e);
            return Partial::degraded(String::new(), e.into());
        }
    };

    let doc = match load_document(&bytes) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!("Error reading PDF {}: {}", file_path.display(), e);
            return Partial::degraded(String::new(), e);
        }
    };

    let mut pages = Vec::new();
    for page_num in doc.get_pages().into_keys() {
        match extract_page(&doc, page_num) {
            Ok(text) => pages.push(text),
            Err(e) => {
                tracing::warn!(
                    "Error reading PDF {} at page {}, keeping {} pages: {}",
                    file_path.display(),
                    page_num,
                    pages.len(),
                    e
                );
                return Partial::degraded(pages.join(PAGE_SEPARATOR), e);
            }
        }
    }

    Partial::clean(pages.join(PAGE_SEPARATOR))
}

/// 加载 PDF 文档
///
/// `pdf-extract` 遇到残缺文件时可能 panic 而不是返回错误，这里统一转换为错误。
/// 加密文档先尝试空密码解密
fn load_document(data: &[u8]) -> Result<Document> {
    let loaded = panic::catch_unwind(AssertUnwindSafe(|| Document::load_mem(data)));

    let mut doc = match loaded {
        Ok(Ok(doc)) => doc,
        Ok(Err(e)) => return Err(LibraryError::Pdf(e.to_string())),
        Err(_) => return Err(LibraryError::Pdf("PDF 库发生 panic，文件可能已损坏".to_string())),
    };

    if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|e| LibraryError::Pdf(format!("加密文档无法解密: {}", e)))?;
    }

    Ok(doc)
}

/// 提取单页文本，页码从 1 开始
///
/// 去掉版面换行带来的首尾空白，页与页之间只留一个分隔符
fn extract_page(doc: &Document, page_num: u32) -> Result<String> {
    let mut text = String::new();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut output = PlainTextOutput::new(&mut text);
        pdf_extract::output_doc_page(doc, &mut output, page_num)
    }));

    match result {
        Ok(Ok(())) => Ok(text.trim().to_string()),
        Ok(Err(e)) => Err(LibraryError::Pdf(format!("第 {} 页: {}", page_num, e))),
        Err(_) => Err(LibraryError::Pdf(format!("第 {} 页: PDF 库发生 panic", page_num))),
    }
}

/// PDF 解析器
///
/// 只提取文本层，不支持扫描版 PDF
#[derive(Clone)]
pub struct PdfParser;

impl PdfParser {
    /// 创建新的 PDF 解析器实例
    pub fn new() -> Self {
        Self
    }
}

impl Parser for PdfParser {
    fn parse(&self, file_path: &Path) -> Result<Partial<BookContent>> {
        Ok(extract_pdf_text(file_path).map(|text| BookContent::Pdf { text }))
    }

    fn book_type(&self) -> BookType {
        BookType::Pdf
    }

    fn supported_extensions(&self) -> Vec<&str> {
        vec!["pdf"]
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}
