//! 作品集接口模型

use crate::models::err::AppError;
use bundle_storage::StorageId;
use chrono::{DateTime, Utc};
use database::CollectionKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// 作品集信息
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct CollectionInfo {
    #[schema(example = "V1StGXR8_Z5jdHi6B-myT")]
    /// 作品集ID
    pub id: String,

    #[schema(example = "run")]
    /// 作品集类型，`link` 或 `run`
    pub kind: String,

    #[schema(example = "Snake")]
    /// 名称
    pub name: String,

    /// 简介
    pub description: String,

    #[schema(example = json!(["game", "canvas"]))]
    /// 标签列表
    pub tags: Vec<String>,

    /// 外部链接，仅 `link` 类型
    pub link: Option<String>,

    /// 缩略图地址
    pub thumbnail: Option<String>,

    /// 运行包存储标识，仅 `run` 类型
    pub storage_id: Option<String>,

    #[schema(example = "/runner/V1StGXR8_Z5jdHi6B-myT/")]
    /// 运行包入口地址，仅 `run` 类型
    pub runner_url: Option<String>,

    /// 浏览次数
    pub views: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<database::CollectionInfo> for CollectionInfo {
    fn from(info: database::CollectionInfo) -> Self {
        let tags = info.tag_list();
        let runner_url = (info.kind == CollectionKind::Run).then(|| runner_url(&info.id));

        Self {
            id: info.id,
            kind: info.kind.to_string(),
            name: info.name,
            description: info.description,
            tags,
            link: info.link,
            thumbnail: info.thumbnail,
            storage_id: info.storage_id,
            runner_url,
            views: info.views,
            created_at: info.created_at,
            updated_at: info.updated_at,
        }
    }
}

/// 作品集运行包入口
///
/// 带结尾斜杠，保证运行包内的相对路径按目录解析。
pub fn runner_url(id: &str) -> String {
    format!("/runner/{id}/")
}

/// 创建作品集
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct CollectionCreate {
    #[schema(example = "run")]
    /// 作品集类型，`link` 或 `run`
    pub kind: String,

    #[schema(example = "Snake")]
    #[validate(length(min = 1, max = 200))]
    /// 名称
    pub name: String,

    #[validate(length(min = 1, max = 2000))]
    /// 简介
    pub description: String,

    #[schema(example = "game, canvas")]
    /// 逗号分隔的标签
    pub tags: Option<String>,

    #[validate(url)]
    /// 外部链接，`link` 类型必填
    pub link: Option<String>,

    /// 缩略图地址
    pub thumbnail: Option<String>,

    /// 上传接口返回的存储标识，`run` 类型必填
    pub storage_id: Option<String>,
}

/// 更新作品集，未提供的字段保持不变
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct CollectionUpdate {
    pub kind: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,

    pub tags: Option<String>,

    #[validate(url)]
    pub link: Option<String>,

    pub thumbnail: Option<String>,

    pub storage_id: Option<String>,
}

/// 浏览计数结果
#[derive(Deserialize, Debug, ToSchema, Serialize)]
pub struct ViewCount {
    #[schema(example = 42)]
    pub views: i64,
}

/// 解析作品集类型
pub fn parse_kind(raw: &str) -> Result<CollectionKind, AppError> {
    raw.parse().map_err(|_| AppError::BadRequest("invalid-kind"))
}

/// 检查作品集类型与引用字段是否匹配
///
/// - `link` 类型必须有非空的 `link`
/// - `run` 类型必须有格式正确的 `storage_id`
pub fn check_kind_refs(kind: CollectionKind, link: Option<&str>, storage_id: Option<&str>) -> Result<(), AppError> {
    match kind {
        CollectionKind::Link if link.is_none_or(str::is_empty) => Err(AppError::BadRequest("missing-link")),
        CollectionKind::Run => match storage_id {
            Some(id) if StorageId::parse(id).is_ok() => Ok(()),
            _ => Err(AppError::BadRequest("missing-storage-id")),
        },
        CollectionKind::Link => Ok(()),
    }
}
