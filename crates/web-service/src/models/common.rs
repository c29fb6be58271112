use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 封装符合json-api的单个返回对象
///
/// 具体参考：<https://jsonapi.org>
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct Reply<T> {
    pub data: T,
}

/// 封装符合json-api的列表对象
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct ReplyList<T> {
    pub data: Vec<T>,

    #[schema(example = 12)]
    /// 列表总数
    pub total: u32,
}

/// 错误返回对象
#[derive(Debug, ToSchema, Serialize)]
pub struct ErrorReply {
    #[schema(example = "no-files")]
    /// 机器可读的错误码
    pub error: String,
}
