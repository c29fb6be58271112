//! 登录失败计数仓库 trait 定义

use crate::models::login_attempt::LoginAttempt;
use crate::DatabaseResult;
use chrono::{DateTime, Utc};

/// 按客户端地址记录的登录失败计数
#[async_trait::async_trait]
pub trait LoginAttemptRepositoryTrait: Send + Sync + 'static {
    /// 查询客户端地址的失败记录，没有记录时返回 `None`
    async fn get_attempt(&self, ip: &str) -> DatabaseResult<Option<LoginAttempt>>;

    /// 记录一次失败
    ///
    /// 失败次数原子加一；累加后达到 `max_attempts` 时把锁定截止时间设置为 `lock_until`。
    ///
    /// # 返回值
    /// 返回更新后的记录
    async fn record_failure(&self, ip: &str, max_attempts: i32, lock_until: DateTime<Utc>) -> DatabaseResult<LoginAttempt>;

    /// 登录成功后清空失败记录
    async fn reset_attempts(&self, ip: &str) -> DatabaseResult<()>;
}
