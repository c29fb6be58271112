//! 访问统计仓库 trait 定义

use crate::models::stats::AdminStats;
use crate::DatabaseResult;

#[async_trait::async_trait]
pub trait StatsRepositoryTrait: Send + Sync + 'static {
    /// 全局访问次数加一，返回累加后的值
    async fn increment_global_hits(&self) -> DatabaseResult<i64>;

    /// 汇总管理后台统计数据
    async fn get_admin_stats(&self) -> DatabaseResult<AdminStats>;
}
