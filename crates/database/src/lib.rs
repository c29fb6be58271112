//! 数据库操作模块
//!
//! 这个模块提供了数据库连接、迁移，以及作品集、登录失败计数、访问统计三类数据的仓库。

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;

pub use connection::{initialize_database, DatabasePool};
pub use error::DatabaseError;
pub use models::{
    AdminStats, CollectionCreate, CollectionInfo, CollectionKind, CollectionUpdate, LoginAttempt,
};
pub use repositories::{
    CollectionRepository, CollectionRepositoryTrait, LoginAttemptRepository, LoginAttemptRepositoryTrait,
    StatsRepository, StatsRepositoryTrait,
};

/// 数据库操作结果类型
pub type DatabaseResult<T> = Result<T, DatabaseError>;
