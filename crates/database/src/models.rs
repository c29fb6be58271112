//! 数据库模型模块
//!
//! 这里定义与数据库表对应的结构体和相关操作

pub mod collection;
pub mod login_attempt;
pub mod stats;

// 重新导出具体的模型
pub use collection::{CollectionCreate, CollectionInfo, CollectionKind, CollectionUpdate};
pub use login_attempt::LoginAttempt;
pub use stats::AdminStats;
