//! 运行包文件解析
//!
//! 1. 子路径为空时默认 `index.html`
//! 2. 拼接并规范化目标路径，要求其仍位于运行包目录之下，否则 [`StorageError::Forbidden`]
//! 3. 目标不存在返回 [`StorageError::NotFound`]
//! 4. 目标是目录时，按 [`IndexFallback`] 决定是否尝试目录下的 `index.html`
//!
//! 运行包内部的符号链接不做特殊处理，行为取决于文件系统。

use crate::content_type::classify_path;
use crate::error::{StorageError, StorageResult};
use crate::path::join_within;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// 默认入口文件
pub const INDEX_FILE: &str = "index.html";

/// 请求目录时是否回退到目录下的 `index.html`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFallback {
    Enabled,
    Disabled,
}

/// 解析成功的文件
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    /// 文件内容
    pub content: Vec<u8>,

    /// 根据扩展名得到的 `Content-Type`
    pub content_type: &'static str,
}

pub(crate) async fn resolve_in(
    bundle_dir: &Path,
    sub_path: Option<&str>,
    fallback: IndexFallback,
) -> StorageResult<ResolvedFile> {
    let sub_path = sub_path.filter(|p| !p.is_empty()).unwrap_or(INDEX_FILE);

    let target = join_within(bundle_dir, Path::new(sub_path)).ok_or_else(|| {
        debug!("🚫 路径越界: {:?}", sub_path);
        StorageError::Forbidden
    })?;

    let file_path = if lookup(&target).await?.is_dir() {
        if fallback == IndexFallback::Disabled {
            return Err(StorageError::NotFound);
        }

        let index = target.join(INDEX_FILE);
        if !lookup(&index).await?.is_file() {
            return Err(StorageError::NotFound);
        }
        index
    } else {
        target
    };

    let content = tokio::fs::read(&file_path).await.map_err(not_found_or_io)?;

    Ok(ResolvedFile {
        content,
        content_type: classify_path(&file_path),
    })
}

async fn lookup(path: &Path) -> StorageResult<Metadata> {
    tokio::fs::metadata(path).await.map_err(not_found_or_io)
}

fn not_found_or_io(err: std::io::Error) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory | ErrorKind::InvalidInput => StorageError::NotFound,
        _ => StorageError::Io(err),
    }
}
