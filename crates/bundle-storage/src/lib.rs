//! 运行包存储模块
//!
//! 负责上传的静态站点（运行包）在磁盘上的写入与读取，目录结构为
//! `<storage_root>/run/<storage_id>/...`。
//!
//! 其他模块不应直接访问存储目录，所有读写都通过 [`BundleStore`] 完成，
//! 路径越界检查只在这里实现一次。

pub mod content_type;
pub mod error;
pub mod id;
pub mod ingest;
pub mod path;
pub mod resolve;
pub mod store;

pub use content_type::{classify, classify_path};
pub use error::{StorageError, StorageResult};
pub use id::{generate_id, StorageId};
pub use ingest::{IngestLimits, IngestMode, UploadedFile};
pub use resolve::{IndexFallback, ResolvedFile, INDEX_FILE};
pub use store::BundleStore;
