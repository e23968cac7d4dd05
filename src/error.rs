use std::path::PathBuf;
use thiserror::Error;

/// 书库错误
///
/// 解析类错误（Epub / Pdf / MissingItem）通常不会直接抛给调用方，
/// 而是作为诊断信息记录在 [`Partial`] 中
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("EPUB 解析错误: {0}")]
    Epub(String),
    #[error("PDF 解析失败: {0}")]
    Pdf(String),
    #[error("找不到条目: {0}")]
    MissingItem(String),
    #[error("不支持的文件格式: {0}")]
    UnsupportedFormat(String),
    #[error("未选择文件")]
    EmptyFilename,
    #[error("非法路径: {0}")]
    InvalidPath(String),
    #[error("文件过大: {size} 字节，上限 {limit} 字节")]
    TooLarge { size: u64, limit: u64 },
    #[error("文件不存在: {0}")]
    NotFound(PathBuf),
    #[error("配置错误: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

/// 尽力而为的结果
///
/// 总是携带一个可用的值；过程中被吸收的错误保存在 `diagnostics` 里
#[derive(Debug)]
pub struct Partial<T> {
    pub value: T,
    pub diagnostics: Vec<LibraryError>,
}

impl<T> Partial<T> {
    /// 没有任何错误的结果
    pub fn clean(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    /// 带一条诊断信息的降级结果
    pub fn degraded(value: T, error: LibraryError) -> Self {
        Self {
            value,
            diagnostics: vec![error],
        }
    }

    pub fn push(&mut self, error: LibraryError) {
        self.diagnostics.push(error);
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Partial<U> {
        Partial {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_clean() {
        let p = Partial::clean(3);
        assert!(p.is_clean());
        assert_eq!(p.into_value(), 3);
    }

    #[test]
    fn test_partial_degraded_keeps_value() {
        let mut p = Partial::degraded(String::from("abc"), LibraryError::Pdf("bad xref".into()));
        p.push(LibraryError::MissingItem("ch1".into()));
        assert!(!p.is_clean());
        assert_eq!(p.diagnostics.len(), 2);

        let mapped = p.map(|s| s.len());
        assert_eq!(mapped.value, 3);
        assert_eq!(mapped.diagnostics.len(), 2);
    }

    #[test]
    fn test_error_messages() {
        let err = LibraryError::UnsupportedFormat("txt".into());
        assert!(err.to_string().contains("不支持的文件格式"));

        let err = LibraryError::TooLarge { size: 20, limit: 10 };
        assert!(err.to_string().contains("20"));
    }
}
