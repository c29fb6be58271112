use thiserror::Error;

/// 运行包存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// 上传请求中没有任何文件
    #[error("上传内容为空")]
    EmptyUpload,

    /// 条目路径规范化之后落在运行包目录之外（zip-slip）
    #[error("条目路径越界: {0}")]
    PathEscape(String),

    /// 条目名称为空，或者规范化之后指向运行包根目录本身
    #[error("无效的条目名称: {0:?}")]
    InvalidEntry(String),

    /// 压缩包无法解析
    #[error("无效的压缩包: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    /// 写入总字节数（压缩包按解压后计算）超过上限
    #[error("运行包超过 {0} 字节上限")]
    BundleTooLarge(u64),

    /// 条目数量超过上限
    #[error("条目数量超过 {0} 个上限")]
    TooManyEntries(usize),

    /// 存储标识格式不正确
    #[error("无效的存储标识")]
    InvalidStorageId,

    /// 请求的文件不存在
    #[error("文件不存在")]
    NotFound,

    /// 请求路径越出运行包目录
    #[error("禁止访问")]
    Forbidden,

    /// 文件系统错误
    #[error("存储IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 存储操作结果类型
pub type StorageResult<T> = Result<T, StorageError>;
