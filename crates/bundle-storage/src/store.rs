use crate::error::{StorageError, StorageResult};
use crate::id::StorageId;
use crate::ingest::{ingest_archive, plan_file_list, write_files, IngestLimits, IngestMode};
use crate::path::normalize;
use crate::resolve::{resolve_in, IndexFallback, ResolvedFile};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 运行包在存储根目录下的命名空间
const RUN_NAMESPACE: &str = "run";

/// 运行包存储
///
/// 每个存储标识对应的目录只在上传时写入一次，之后只读，所以不需要加锁。
#[derive(Debug, Clone)]
pub struct BundleStore {
    /// 规范化后的 `<storage_root>/run`
    run_root: PathBuf,
    limits: IngestLimits,
}

impl BundleStore {
    /// 创建运行包存储，使用默认的大小限制
    ///
    /// 相对路径会基于当前工作目录转换为绝对路径，目录本身在第一次上传时才会创建。
    pub fn new(storage_root: impl AsRef<Path>) -> StorageResult<Self> {
        let absolute = std::path::absolute(storage_root.as_ref())?;
        Ok(Self {
            run_root: normalize(&absolute.join(RUN_NAMESPACE)),
            limits: IngestLimits::default(),
        })
    }

    /// 设置单个运行包的大小限制
    pub fn with_limits(mut self, limits: IngestLimits) -> Self {
        self.limits = limits;
        self
    }

    /// 存储标识对应的运行包目录
    pub fn bundle_dir(&self, storage_id: &StorageId) -> PathBuf {
        self.run_root.join(storage_id.as_str())
    }

    /// 写入一个运行包，返回新分配的存储标识
    ///
    /// 任何条目越界、超过大小限制或写入失败都会让整批上传失败，已经写出的部分会被删除。
    pub async fn ingest(&self, mode: IngestMode) -> StorageResult<StorageId> {
        let storage_id = StorageId::allocate();
        let bundle_dir = self.bundle_dir(&storage_id);

        let result = match mode {
            IngestMode::Archive(bytes) => {
                let dir = bundle_dir.clone();
                let limits = self.limits;
                tokio::task::spawn_blocking(move || ingest_archive(&dir, bytes, &limits))
                    .await
                    .map_err(std::io::Error::other)?
            }
            IngestMode::FileList(files) => match plan_file_list(&bundle_dir, files, &self.limits) {
                Ok(plan) if plan.is_empty() => Err(StorageError::EmptyUpload),
                Ok(plan) => write_files(&bundle_dir, plan).await,
                Err(err) => Err(err),
            },
        };

        match result {
            Ok(written) => {
                info!("📦 运行包写入完成: {} ({} 个文件)", storage_id, written);
                Ok(storage_id)
            }
            Err(err) => {
                discard(&bundle_dir).await;
                Err(err)
            }
        }
    }

    /// 按存储标识解析运行包内的文件
    ///
    /// 格式不正确的存储标识按不存在处理。
    pub async fn resolve(
        &self,
        storage_id: &str,
        sub_path: Option<&str>,
        fallback: IndexFallback,
    ) -> StorageResult<ResolvedFile> {
        debug!("🔍 解析运行包文件 {} {:?}", storage_id, sub_path);

        let storage_id = StorageId::parse(storage_id).map_err(|_| StorageError::NotFound)?;
        resolve_in(&self.bundle_dir(&storage_id), sub_path, fallback).await
    }
}

/// 删除写入失败的运行包目录，目录不存在时什么也不做
async fn discard(bundle_dir: &Path) {
    match tokio::fs::remove_dir_all(bundle_dir).await {
        Ok(()) => warn!("🧹 已删除写入失败的运行包目录 {}", bundle_dir.display()),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => warn!("删除运行包目录 {} 失败: {err}", bundle_dir.display()),
    }
}
