//! 数据库仓库模块
//!
//! 这里定义数据库操作的Repository层

pub mod collection;
pub mod login_attempt;
pub mod stats;
pub mod traits;

// 重新导出具体的类型
pub use collection::CollectionRepository;
pub use login_attempt::LoginAttemptRepository;
pub use stats::StatsRepository;
pub use traits::{CollectionRepositoryTrait, LoginAttemptRepositoryTrait, StatsRepositoryTrait};
