//! 管理员接口模型

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 管理员登录
#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    /// 管理员密钥
    pub key: String,
}

/// 登录成功返回
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct LoginReply {
    pub ok: bool,

    /// 会话令牌，也会通过 `Set-Cookie` 下发
    pub token: String,

    #[schema(example = 1735689600)]
    /// 令牌过期时间（Unix 秒）
    pub expires_at: i64,
}

/// 退出登录返回
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct LogoutReply {
    pub ok: bool,
}

/// 管理后台统计
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct AdminStatsInfo {
    #[schema(example = 1024)]
    /// 作品集列表被访问的总次数
    pub total_hits: i64,

    #[schema(example = 512)]
    /// 所有作品集的浏览次数之和
    pub total_views: i64,

    #[schema(example = 12)]
    /// 作品集数量
    pub project_count: i64,
}

impl From<database::AdminStats> for AdminStatsInfo {
    fn from(stats: database::AdminStats) -> Self {
        Self {
            total_hits: stats.total_hits,
            total_views: stats.total_views,
            project_count: stats.project_count,
        }
    }
}
