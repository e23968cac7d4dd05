use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LibraryConfig;
use crate::error::{LibraryError, Result};
use crate::library::UPLOADS_AREA;
use crate::parser::BookType;

/// 已保存的上传文件
#[derive(Debug, Clone, Serialize)]
pub struct StoredBook {
    pub filename: String,
    #[serde(rename = "type")]
    pub book_type: BookType,
    /// `uploads/<文件名>`
    pub path: String,
    pub size: u64,
    pub saved_at: DateTime<Utc>,
    /// 磁盘上的完整路径
    #[serde(skip)]
    pub full_path: PathBuf,
}

/// 上传处理器
///
/// 校验文件名、格式和大小后，把文件写入上传区
#[derive(Debug, Clone)]
pub struct UploadHandler {
    uploads_dir: PathBuf,
    max_upload_bytes: u64,
}

impl UploadHandler {
    pub fn new(config: &LibraryConfig) -> Self {
        Self {
            uploads_dir: config.uploads_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// 保存上传的文件
    ///
    /// # 参数
    /// - `filename`: 客户端提供的文件名，只保留最后一段
    /// - `bytes`: 文件内容
    ///
    /// # 返回
    /// 保存结果；同名文件会被覆盖
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredBook> {
        let filename = sanitize_filename(filename)?;
        let book_type = BookType::from_path(Path::new(&filename))
            .ok_or_else(|| LibraryError::UnsupportedFormat(filename.clone()))?;

        let size = bytes.len() as u64;
        self.check_size(size)?;

        fs::create_dir_all(&self.uploads_dir)?;
        let full_path = self.uploads_dir.join(&filename);
        fs::write(&full_path, bytes)?;

        tracing::info!("Saved upload {} ({} bytes)", full_path.display(), size);

        Ok(StoredBook {
            path: format!("{}/{}", UPLOADS_AREA, filename),
            filename,
            book_type,
            size,
            saved_at: Utc::now(),
            full_path,
        })
    }

    /// 从本地文件上传
    ///
    /// 先检查文件大小，避免把超限文件整个读进内存
    pub fn save_file(&self, source: &Path) -> Result<StoredBook> {
        let filename = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or(LibraryError::EmptyFilename)?;

        if BookType::from_path(source).is_none() {
            return Err(LibraryError::UnsupportedFormat(filename));
        }

        let metadata = fs::metadata(source).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LibraryError::NotFound(source.to_path_buf()),
            _ => LibraryError::Io(e),
        })?;
        self.check_size(metadata.len())?;

        let bytes = fs::read(source)?;
        self.save(&filename, &bytes)
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_upload_bytes {
            return Err(LibraryError::TooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }
        Ok(())
    }
}

/// 清理客户端提供的文件名
///
/// 去掉目录部分（同时处理 `/` 和 `\`），拒绝空名、隐藏文件和 `..`
fn sanitize_filename(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(LibraryError::EmptyFilename);
    }

    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() || base.starts_with('.') || base.contains('\0') {
        return Err(LibraryError::InvalidPath(raw.to_string()));
    }

    Ok(base.to_string())
}
