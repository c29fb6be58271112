//! 作品集仓库 trait 定义

use crate::models::collection::{CollectionCreate, CollectionInfo, CollectionUpdate};
use crate::DatabaseResult;

/// 作品集仓库trait定义
///
/// 定义了作品集相关的数据库操作接口，支持：
/// - 作品集列表（按创建时间倒序）
/// - 作品集创建
/// - 作品集查询
/// - 作品集更新
/// - 作品集删除
/// - 浏览次数累加
#[async_trait::async_trait]
pub trait CollectionRepositoryTrait: Send + Sync + 'static {
    /// 查询全部作品集，最新创建的排在前面
    async fn list_collections(&self) -> DatabaseResult<Vec<CollectionInfo>>;

    /// 创建新作品集
    ///
    /// # 参数
    /// - `collection`: 作品集创建信息，`id` 由调用方分配
    ///
    /// # 返回值
    /// 返回创建的作品集信息
    async fn create_collection(&self, collection: CollectionCreate) -> DatabaseResult<CollectionInfo>;

    /// 根据 ID 获取作品集
    ///
    /// 不存在时返回 [`crate::DatabaseError::NotFound`]
    async fn get_collection_by_id(&self, id: &str) -> DatabaseResult<CollectionInfo>;

    /// 更新作品集信息
    ///
    /// # 参数
    /// - `id`: 作品集 ID
    /// - `update`: 更新信息，`None` 的字段保留原值
    ///
    /// # 返回值
    /// 返回更新后的作品集信息
    async fn update_collection(&self, id: &str, update: CollectionUpdate) -> DatabaseResult<CollectionInfo>;

    /// 删除作品集记录
    ///
    /// 只删除数据库记录，运行包目录保留在磁盘上。
    ///
    /// # 返回值
    /// 返回被删除的作品集信息
    async fn delete_collection(&self, id: &str) -> DatabaseResult<CollectionInfo>;

    /// 浏览次数加一，返回累加后的值
    async fn increment_views(&self, id: &str) -> DatabaseResult<i64>;
}
