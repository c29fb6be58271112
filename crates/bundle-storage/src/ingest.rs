//! 运行包写入
//!
//! 上传在边界处只判断一次类型（[`IngestMode`]），然后分别走压缩包和文件列表两条路径。
//! 两条路径都先校验全部条目的目标路径，只要有一个条目越界，整批上传失败，且不会创建任何目录。
//!
//! 压缩包分两遍处理：第一遍只读取中央目录里的条目名称，不解压；第二遍逐个条目流式写入文件，
//! 同时累计解压后的字节数，超过 [`IngestLimits::max_total_bytes`] 立即失败。
//! 条目头部声明的大小只用于提前拒绝，不作为分配内存的依据。

use crate::error::{StorageError, StorageResult};
use crate::path::join_within;
use std::fs::File;
use std::io::{self, Cursor, ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// 压缩包扩展名
const ARCHIVE_EXTENSION: &str = ".zip";

/// 默认解压后总大小上限
const DEFAULT_MAX_TOTAL_BYTES: u64 = 512 * 1024 * 1024;

/// 默认条目数量上限
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// 单个运行包的大小限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestLimits {
    /// 写入磁盘的总字节数上限（压缩包按解压后计算）
    pub max_total_bytes: u64,
    /// 条目数量上限（包含目录条目）
    pub max_entries: usize,
}

impl IngestLimits {
    pub fn new(max_total_bytes: u64) -> Self {
        Self {
            max_total_bytes,
            ..Self::default()
        }
    }
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// 上传的单个文件
///
/// `name` 可以携带相对目录（例如浏览器目录上传时的 `dist/assets/app.js`）。
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// 上传方式
#[derive(Debug)]
pub enum IngestMode {
    /// 单个 `.zip` 文件，解压到运行包目录
    Archive(Vec<u8>),
    /// 其他情况，逐个文件写入，保留名称中的相对目录
    FileList(Vec<UploadedFile>),
}

impl IngestMode {
    /// 根据上传的文件决定写入方式
    ///
    /// - 没有文件：[`StorageError::EmptyUpload`]
    /// - 恰好一个文件且名称以 `.zip` 结尾（大小写不敏感）：[`IngestMode::Archive`]
    /// - 其他：[`IngestMode::FileList`]
    pub fn from_uploads(mut files: Vec<UploadedFile>) -> StorageResult<Self> {
        match files.len() {
            0 => Err(StorageError::EmptyUpload),
            1 if is_archive_name(&files[0].name) => Ok(Self::Archive(files.remove(0).content)),
            _ => Ok(Self::FileList(files)),
        }
    }
}

fn is_archive_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(ARCHIVE_EXTENSION)
}

/// 计算条目在运行包目录下的目标路径
///
/// 反斜杠按目录分隔符处理，兼容 Windows 客户端生成的名称。
fn entry_destination(bundle_dir: &Path, name: &str) -> StorageResult<PathBuf> {
    let relative = name.replace('\\', "/");

    join_within(bundle_dir, Path::new(&relative)).ok_or_else(|| {
        warn!("🚫 拒绝越界条目: {:?}", name);
        StorageError::PathEscape(name.to_string())
    })
}

fn check_entry_count(count: usize, limits: &IngestLimits) -> StorageResult<()> {
    if count > limits.max_entries {
        warn!("🚫 条目数量 {} 超过上限 {}", count, limits.max_entries);
        return Err(StorageError::TooManyEntries(limits.max_entries));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 文件列表
// ---------------------------------------------------------------------------

/// 校验通过的单个文件
#[derive(Debug)]
pub(crate) struct PlannedFile {
    pub(crate) path: PathBuf,
    pub(crate) content: Vec<u8>,
}

/// 文件列表模式的写入计划
pub(crate) fn plan_file_list(
    bundle_dir: &Path,
    files: Vec<UploadedFile>,
    limits: &IngestLimits,
) -> StorageResult<Vec<PlannedFile>> {
    check_entry_count(files.len(), limits)?;

    let total: u64 = files.iter().map(|f| f.content.len() as u64).sum();
    if total > limits.max_total_bytes {
        return Err(StorageError::BundleTooLarge(limits.max_total_bytes));
    }

    files
        .into_iter()
        .map(|file| {
            let path = entry_destination(bundle_dir, &file.name)?;
            if path == bundle_dir {
                return Err(StorageError::InvalidEntry(file.name));
            }
            Ok(PlannedFile {
                path,
                content: file.content,
            })
        })
        .collect()
}

/// 执行文件列表的写入计划
///
/// `create_dir_all` 对已存在的目录是幂等的，并发的无关上传创建同一个祖先目录不会失败。
pub(crate) async fn write_files(bundle_dir: &Path, plan: Vec<PlannedFile>) -> StorageResult<usize> {
    tokio::fs::create_dir_all(bundle_dir).await?;

    let written = plan.len();
    for file in plan {
        if let Some(parent) = file.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file.path, &file.content).await?;
    }

    Ok(written)
}

// ---------------------------------------------------------------------------
// 压缩包
// ---------------------------------------------------------------------------

/// 压缩包中校验通过的条目
#[derive(Debug)]
pub(crate) struct ArchiveEntry {
    index: usize,
    path: PathBuf,
    is_dir: bool,
}

/// 第一遍：只读取条目名称并校验目标路径，不解压任何内容
pub(crate) fn plan_archive<R: Read + io::Seek>(
    archive: &mut ZipArchive<R>,
    bundle_dir: &Path,
    limits: &IngestLimits,
) -> StorageResult<Vec<ArchiveEntry>> {
    check_entry_count(archive.len(), limits)?;

    let mut plan = Vec::new();
    let mut declared: u64 = 0;

    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        let name = entry.name().to_string();
        let path = entry_destination(bundle_dir, &name)?;
        let is_dir = entry.is_dir();

        if path == bundle_dir {
            if is_dir {
                continue;
            }
            return Err(StorageError::InvalidEntry(name));
        }

        // 声明大小已经超限的压缩包不必解压
        declared = declared.saturating_add(entry.size());
        if declared > limits.max_total_bytes {
            return Err(StorageError::BundleTooLarge(limits.max_total_bytes));
        }

        plan.push(ArchiveEntry { index, path, is_dir });
    }

    Ok(plan)
}

/// 第二遍：逐个条目流式解压写入，按实际解压字节数累计限额
pub(crate) fn extract_archive<R: Read + io::Seek>(
    archive: &mut ZipArchive<R>,
    bundle_dir: &Path,
    plan: Vec<ArchiveEntry>,
    limits: &IngestLimits,
) -> StorageResult<usize> {
    std::fs::create_dir_all(bundle_dir)?;

    let mut remaining = limits.max_total_bytes;
    let mut written = 0;

    for entry in plan {
        if entry.is_dir {
            std::fs::create_dir_all(&entry.path)?;
            continue;
        }
        if let Some(parent) = entry.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = archive.by_index(entry.index)?;
        let mut output = File::create(&entry.path)?;

        // 多读一个字节用来判断是否超限
        let mut limited = file.take(remaining.saturating_add(1));
        let copied = io::copy(&mut limited, &mut output).map_err(archive_or_io)?;
        if copied > remaining {
            return Err(StorageError::BundleTooLarge(limits.max_total_bytes));
        }
        remaining -= copied;
        written += 1;

        debug!("📦 解压条目 {} ({} bytes)", entry.path.display(), copied);
    }

    Ok(written)
}

/// 解压整个压缩包，同步执行，调用方需要放到阻塞线程池
pub(crate) fn ingest_archive(bundle_dir: &Path, bytes: Vec<u8>, limits: &IngestLimits) -> StorageResult<usize> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let plan = plan_archive(&mut archive, bundle_dir, limits)?;
    if plan.is_empty() {
        return Err(StorageError::EmptyUpload);
    }

    extract_archive(&mut archive, bundle_dir, plan, limits)
}

/// 解压数据损坏归为无效压缩包，其他错误归为存储IO错误
fn archive_or_io(err: io::Error) -> StorageError {
    match err.kind() {
        ErrorKind::InvalidData | ErrorKind::InvalidInput | ErrorKind::UnexpectedEof => {
            StorageError::InvalidArchive(ZipError::Io(err))
        }
        _ => StorageError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    const BASE: &str = "/srv/storage/run/abc";

    fn deflated_zip(entries: &[(&str, usize)]) -> Vec<u8> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, size) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(&vec![0u8; *size]).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn open(bytes: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
        ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_single_zip_is_archive() {
        let mode = IngestMode::from_uploads(vec![UploadedFile::new("site.ZIP", b"PK".to_vec())]).unwrap();
        assert!(matches!(mode, IngestMode::Archive(_)));
    }

    #[test]
    fn test_zip_among_many_is_plain_file() {
        let mode = IngestMode::from_uploads(vec![
            UploadedFile::new("site.zip", b"PK".to_vec()),
            UploadedFile::new("index.html", b"<html>".to_vec()),
        ])
        .unwrap();
        assert!(matches!(mode, IngestMode::FileList(files) if files.len() == 2));
    }

    #[test]
    fn test_empty_upload_rejected() {
        assert!(matches!(IngestMode::from_uploads(Vec::new()), Err(StorageError::EmptyUpload)));
    }

    #[test]
    fn test_plan_keeps_relative_directories() {
        let base = Path::new(BASE);
        let plan = plan_file_list(
            base,
            vec![
                UploadedFile::new("dist/assets/app.js", b"1".to_vec()),
                UploadedFile::new("dist\\index.html", b"2".to_vec()),
            ],
            &IngestLimits::default(),
        )
        .unwrap();

        let paths: Vec<PathBuf> = plan.into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec![base.join("dist/assets/app.js"), base.join("dist/index.html")]);
    }

    #[test]
    fn test_plan_rejects_escaping_names() {
        let base = Path::new(BASE);
        for name in ["../../evil.sh", "/etc/cron.d/evil", "a/../../b", "..\\evil.sh"] {
            let result = plan_file_list(base, vec![UploadedFile::new(name, b"x".to_vec())], &IngestLimits::default());
            assert!(matches!(result, Err(StorageError::PathEscape(_))), "{name} should be rejected");
        }
    }

    #[test]
    fn test_plan_rejects_names_pointing_at_root() {
        let base = Path::new(BASE);
        for name in ["", ".", "a/.."] {
            let result = plan_file_list(base, vec![UploadedFile::new(name, b"x".to_vec())], &IngestLimits::default());
            assert!(matches!(result, Err(StorageError::InvalidEntry(_))), "{name:?} should be rejected");
        }
    }

    #[test]
    fn test_file_list_over_limits_rejected() {
        let base = Path::new(BASE);
        let limits = IngestLimits {
            max_total_bytes: 8,
            max_entries: 2,
        };

        let result = plan_file_list(base, vec![UploadedFile::new("a.bin", vec![0u8; 9])], &limits);
        assert!(matches!(result, Err(StorageError::BundleTooLarge(8))));

        let files = (0..3).map(|i| UploadedFile::new(format!("{i}.js"), b"x".to_vec())).collect();
        assert!(matches!(plan_file_list(base, files, &limits), Err(StorageError::TooManyEntries(2))));
    }

    #[test]
    fn test_garbage_archive_rejected() {
        let result = ingest_archive(Path::new(BASE), b"not a zip".to_vec(), &IngestLimits::default());
        assert!(matches!(result, Err(StorageError::InvalidArchive(_))));
    }

    #[test]
    fn test_archive_plan_reads_names_only() {
        let base = Path::new(BASE);
        let mut archive = open(deflated_zip(&[("index.html", 16), ("assets/app.js", 32)]));

        let plan = plan_archive(&mut archive, base, &IngestLimits::default()).unwrap();

        let paths: Vec<PathBuf> = plan.into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec![base.join("index.html"), base.join("assets/app.js")]);
    }

    #[test]
    fn test_archive_declared_size_over_limit_rejected_before_extract() {
        let mut archive = open(deflated_zip(&[("a.bin", 4096), ("b.bin", 4096)]));
        let limits = IngestLimits::new(6000);

        let result = plan_archive(&mut archive, Path::new(BASE), &limits);
        assert!(matches!(result, Err(StorageError::BundleTooLarge(6000))));
    }

    #[test]
    fn test_archive_extraction_enforces_actual_size() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_dir = dir.path().join("bundle");
        let mut archive = open(deflated_zip(&[("a.bin", 4096), ("b.bin", 4096)]));

        // 绕过第一遍的声明大小检查，直接验证流式解压时的限额
        let plan = plan_archive(&mut archive, &bundle_dir, &IngestLimits::default()).unwrap();
        let result = extract_archive(&mut archive, &bundle_dir, plan, &IngestLimits::new(6000));

        assert!(matches!(result, Err(StorageError::BundleTooLarge(6000))));
        // 第二个条目最多只写出限额内的字节
        let partial = std::fs::metadata(bundle_dir.join("b.bin")).map(|m| m.len()).unwrap_or(0);
        assert!(partial <= 6000 - 4096 + 1);
    }

    #[test]
    fn test_archive_too_many_entries_rejected() {
        let mut archive = open(deflated_zip(&[("a.js", 1), ("b.js", 1), ("c.js", 1)]));
        let limits = IngestLimits {
            max_entries: 2,
            ..IngestLimits::default()
        };

        let result = plan_archive(&mut archive, Path::new(BASE), &limits);
        assert!(matches!(result, Err(StorageError::TooManyEntries(2))));
    }
}
