//! 上传接口模型

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 运行包上传结果
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct UploadInfo {
    #[schema(example = "V1StGXR8_Z5jdHi6B-myT")]
    /// 新分配的存储标识，创建 `run` 类型作品集时引用
    pub storage_id: String,
}
