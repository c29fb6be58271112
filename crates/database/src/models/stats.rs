//! 访问统计模型

/// 全局访问计数在 `global_stats` 表中的主键
pub const TOTAL_HITS_KEY: &str = "total_hits";

/// 管理后台统计数据
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct AdminStats {
    /// 作品集列表被访问的总次数
    pub total_hits: i64,
    /// 所有作品集的浏览次数之和
    pub total_views: i64,
    /// 作品集数量
    pub project_count: i64,
}
