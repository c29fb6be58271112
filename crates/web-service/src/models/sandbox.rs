//! 沙箱策略接口模型

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 沙箱策略
///
/// 前端渲染运行包 iframe 时直接使用这里的 `sandbox` 属性值。
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct SandboxPolicyInfo {
    #[schema(example = "allow-scripts allow-forms allow-modals allow-popups")]
    /// 全页运行时的沙箱属性
    pub runner: String,

    #[schema(example = "allow-scripts")]
    /// 缩略图预览的沙箱属性
    pub thumbnail: String,
}
