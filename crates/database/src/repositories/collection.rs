//! 作品集仓库
//!
//! 负责作品集相关的数据库操作

use crate::models::collection::{CollectionCreate, CollectionInfo, CollectionUpdate};
use crate::repositories::traits::CollectionRepositoryTrait;
use crate::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::debug;

/// 查询作品集时返回的全部字段
const COLLECTION_COLUMNS: &str =
    "id, kind, name, description, tags, link, thumbnail, storage_id, views, created_at, updated_at";

/// 作品集仓库结构体
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    pool: PgPool,
}

impl CollectionRepository {
    /// 创建新的作品集仓库实例
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CollectionRepositoryTrait for CollectionRepository {
    async fn list_collections(&self) -> DatabaseResult<Vec<CollectionInfo>> {
        debug!("🔍 查询作品集列表");

        let collections = sqlx::query_as::<_, CollectionInfo>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!("✅ 查询完成 - 共 {} 个作品集", collections.len());
        Ok(collections)
    }

    /// 创建新作品集
    ///
    /// `created_at`、`updated_at` 由数据库生成，`views` 从 0 开始。
    async fn create_collection(&self, collection: CollectionCreate) -> DatabaseResult<CollectionInfo> {
        debug!("📝 创建作品集: {:#?}", collection);

        let info = sqlx::query_as::<_, CollectionInfo>(&format!(
            r#"
            INSERT INTO collections (id, kind, name, description, tags, link, thumbnail, storage_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now())
            RETURNING {COLLECTION_COLUMNS}
            "#
        ))
        .bind(&collection.id)
        .bind(collection.kind.as_str())
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(&collection.tags)
        .bind(&collection.link)
        .bind(&collection.thumbnail)
        .bind(&collection.storage_id)
        .fetch_one(&self.pool)
        .await?;

        debug!("✅ 作品集创建成功: {}", info.id);
        Ok(info)
    }

    async fn get_collection_by_id(&self, id: &str) -> DatabaseResult<CollectionInfo> {
        debug!("🔍 根据 ID 获取作品集: {}", id);

        sqlx::query_as::<_, CollectionInfo>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found(format!("collection {id}")))
    }

    /// 更新作品集信息
    ///
    /// 使用 `coalesce` 合并可选字段：传入 `None` 会被转换为数据库的 null，最终保留原值。
    async fn update_collection(&self, id: &str, update: CollectionUpdate) -> DatabaseResult<CollectionInfo> {
        debug!("🔄 更新作品集 {} 信息: {:#?}", id, update);

        let info = sqlx::query_as::<_, CollectionInfo>(&format!(
            r#"
            UPDATE collections
            SET kind = coalesce($2, kind),
                name = coalesce($3, name),
                description = coalesce($4, description),
                tags = coalesce($5, tags),
                link = coalesce($6, link),
                thumbnail = coalesce($7, thumbnail),
                storage_id = coalesce($8, storage_id),
                updated_at = now()
            WHERE id = $1
            RETURNING {COLLECTION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.kind.map(|kind| kind.as_str()))
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.tags)
        .bind(&update.link)
        .bind(&update.thumbnail)
        .bind(&update.storage_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found(format!("collection {id}")))?;

        debug!("✅ 作品集更新成功: {}", info.id);
        Ok(info)
    }

    async fn delete_collection(&self, id: &str) -> DatabaseResult<CollectionInfo> {
        debug!("🗑️ 删除作品集: {}", id);

        let info = sqlx::query_as::<_, CollectionInfo>(&format!(
            "DELETE FROM collections WHERE id = $1 RETURNING {COLLECTION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found(format!("collection {id}")))?;

        debug!("✅ 作品集删除成功: {}", info.id);
        Ok(info)
    }

    async fn increment_views(&self, id: &str) -> DatabaseResult<i64> {
        debug!("👀 作品集 {} 浏览次数 +1", id);

        let views: i64 = sqlx::query_scalar(
            "UPDATE collections SET views = views + 1 WHERE id = $1 RETURNING views",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found(format!("collection {id}")))?;

        Ok(views)
    }
}
