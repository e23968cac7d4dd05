use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::LibraryConfig;
use crate::error::{LibraryError, Result};
use crate::metadata::resolve_title;
use crate::parser::BookType;

/// 用户上传区
pub const UPLOADS_AREA: &str = "uploads";
/// 精选书籍区
pub const BOOKS_AREA: &str = "books";

/// 书库条目
///
/// 每次请求都从文件系统重新计算，不做缓存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub filename: String,
    pub title: String,
    #[serde(rename = "type")]
    pub book_type: BookType,
    /// `<区域名>/<文件名>`，可直接用于拼接文件访问地址
    pub path: String,
}

/// 存储区域：一个名字和一个平铺目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageArea {
    pub name: &'static str,
    pub root: PathBuf,
}

impl StorageArea {
    pub fn new(name: &'static str, root: impl Into<PathBuf>) -> Self {
        Self {
            name,
            root: root.into(),
        }
    }

    /// 列出区域内指定类型的书籍文件名（按名称排序）
    ///
    /// 只看目录下的普通文件，跳过隐藏文件；目录不存在时视为空
    pub fn file_names(&self, book_type: BookType) -> Vec<String> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("Cannot scan {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .filter(|name| BookType::from_path(Path::new(name)) == Some(book_type))
            .collect();

        names.sort();
        names
    }

    fn entry_path(&self, filename: &str) -> String {
        format!("{}/{}", self.name, filename)
    }
}

/// 书库索引器
///
/// 扫描上传区和精选区，生成书库目录
#[derive(Debug, Clone)]
pub struct Library {
    areas: Vec<StorageArea>,
}

impl Library {
    pub fn new(config: &LibraryConfig) -> Self {
        Self {
            areas: vec![
                StorageArea::new(UPLOADS_AREA, &config.uploads_dir),
                StorageArea::new(BOOKS_AREA, &config.books_dir),
            ],
        }
    }

    /// 存储区域，上传区在前
    pub fn areas(&self) -> &[StorageArea] {
        &self.areas
    }

    pub fn area(&self, name: &str) -> Option<&StorageArea> {
        self.areas.iter().find(|area| area.name == name)
    }

    /// 列出书库中的所有书籍
    ///
    /// 顺序：先上传区后精选区；每个区域内先 EPUB 后 PDF，同类型按文件名排序。
    /// 不去重
    pub fn list(&self) -> Vec<LibraryEntry> {
        let mut library = Vec::new();

        for area in &self.areas {
            for book_type in BookType::ALL {
                for filename in area.file_names(book_type) {
                    let title = resolve_title(&area.root.join(&filename), book_type).into_value();
                    library.push(LibraryEntry {
                        path: area.entry_path(&filename),
                        filename,
                        title,
                        book_type,
                    });
                }
            }
        }

        tracing::debug!("Library scan found {} books", library.len());
        library
    }

    /// 把 `<区域名>/<文件名>` 解析为磁盘路径
    ///
    /// 区域未知、路径层级不对或包含 `..` 时返回 `InvalidPath`，文件不存在时返回 `NotFound`
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let invalid = || LibraryError::InvalidPath(relative.to_string());

        let (area_name, filename) = relative.split_once('/').ok_or_else(invalid)?;
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\', '\0'])
        {
            return Err(invalid());
        }

        let area = self.area(area_name).ok_or_else(invalid)?;
        let full_path = area.root.join(filename);
        if !full_path.is_file() {
            return Err(LibraryError::NotFound(full_path));
        }

        Ok(full_path)
    }
}
