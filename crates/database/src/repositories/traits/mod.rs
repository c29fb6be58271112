//! 数据库仓库 trait 定义
//!
//! 这里定义了各种数据库仓库的抽象接口
//!
//! ## 约束 🎯
//!
//! 所有 Repository trait 统一使用 `Send + Sync + 'static` 约束：
//!
//! - `Send` / `Sync`：仓库实例在多个请求、多个线程之间共享
//! - `'static`：仓库作为应用服务长期存活，不持有短期引用
//!
//! Web 层以 `Arc<dyn XxxRepositoryTrait>` 的形式持有仓库，
//! 生产环境注入 Postgres 实现，HTTP 测试注入内存实现：
//!
//! ```rust,ignore
//! let state = AppState {
//!     collections: Arc::new(CollectionRepository::new(pool.clone())),
//!     login_attempts: Arc::new(LoginAttemptRepository::new(pool.clone())),
//!     stats: Arc::new(StatsRepository::new(pool.clone())),
//!     ..
//! };
//! ```
//!
//! 所有方法都是异步的，并统一返回 [`crate::DatabaseResult`]。

pub mod collection;
pub mod login_attempt;
pub mod stats;

// 重新导出
pub use collection::CollectionRepositoryTrait;
pub use login_attempt::LoginAttemptRepositoryTrait;
pub use stats::StatsRepositoryTrait;
