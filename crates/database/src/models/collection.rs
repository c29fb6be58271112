//! 作品集数据库模型
//!
//! 一条作品集记录要么是外部链接（`link`），要么是上传的运行包（`run`）。

use crate::DatabaseError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// 作品集类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// 外部链接，`link` 字段必填
    Link,
    /// 运行包，`storage_id` 字段必填
    Run,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Run => "run",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(Self::Link),
            "run" => Ok(Self::Run),
            other => Err(DatabaseError::ValidationError(format!("未知的作品集类型: {other}"))),
        }
    }
}

impl TryFrom<String> for CollectionKind {
    type Error = DatabaseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 作品集信息
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionInfo {
    pub id: String,
    #[sqlx(try_from = "String")]
    pub kind: CollectionKind,
    pub name: String,
    pub description: String,
    /// 逗号分隔的标签
    pub tags: Option<String>,
    pub link: Option<String>,
    pub thumbnail: Option<String>,
    pub storage_id: Option<String>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CollectionInfo {
    /// 拆分后的标签列表，忽略空白项
    pub fn tag_list(&self) -> Vec<String> {
        split_tags(self.tags.as_deref())
    }
}

/// 拆分逗号分隔的标签
pub fn split_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|tags| {
        tags.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// 作品集创建参数
#[derive(Debug, Clone)]
pub struct CollectionCreate {
    pub id: String,
    pub kind: CollectionKind,
    pub name: String,
    pub description: String,
    pub tags: Option<String>,
    pub link: Option<String>,
    pub thumbnail: Option<String>,
    pub storage_id: Option<String>,
}

/// 作品集更新参数
///
/// 字段为 `None` 时保留原值。
#[derive(Debug, Clone, Default)]
pub struct CollectionUpdate {
    pub kind: Option<CollectionKind>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub link: Option<String>,
    pub thumbnail: Option<String>,
    pub storage_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_text() {
        for kind in [CollectionKind::Link, CollectionKind::Run] {
            assert_eq!(kind.as_str().parse::<CollectionKind>().unwrap(), kind);
        }
        assert!("zip".parse::<CollectionKind>().is_err());
        assert!("RUN".parse::<CollectionKind>().is_err());
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags(Some(" rust, wasm ,,demo ")), vec!["rust", "wasm", "demo"]);
        assert!(split_tags(Some("  ")).is_empty());
        assert!(split_tags(None).is_empty());
    }
}
