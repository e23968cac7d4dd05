use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LibraryError, Result};

/// 默认上传大小上限：16 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// 书库配置
///
/// 两个存储目录和上传大小上限，在构造 [`crate::library::Library`] 和
/// [`crate::storage::UploadHandler`] 时显式传入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// 用户上传目录
    pub uploads_dir: PathBuf,
    /// 精选书籍目录
    pub books_dir: PathBuf,
    /// 单个上传文件的最大字节数
    pub max_upload_bytes: u64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("uploads"),
            books_dir: PathBuf::from("books"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl LibraryConfig {
    /// 以 `root` 为根目录的配置（`root/uploads`、`root/books`）
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            uploads_dir: root.join("uploads"),
            books_dir: root.join("books"),
            ..Self::default()
        }
    }

    /// 加载配置
    ///
    /// 给定路径时从 JSON 文件读取，缺失字段使用默认值；否则直接返回默认配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| LibraryError::Config(format!("{}: {}", path.display(), e)))?;

        if config.max_upload_bytes == 0 {
            return Err(LibraryError::Config("max_upload_bytes 必须大于 0".to_string()));
        }

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
