//! 仓储 Trait 定义
//!
//! 服务层只依赖此接口，PostgreSQL 与内存实现可互换，也便于 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewStudy, NewVariantEvent, Study, StudyKind, VariantEvent};

/// 实验仓储接口，按实验族参数化
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudyRepository<K: StudyKind>: Send + Sync {
    /// 原子地写入父记录及其全部变体事件
    async fn create_with_events(
        &self,
        study: NewStudy<K>,
        events: Vec<NewVariantEvent>,
    ) -> Result<(Study<K>, Vec<VariantEvent>)>;

    /// 按 id 查询未删除的父记录
    async fn find_active(&self, id: i64) -> Result<Option<Study<K>>>;

    /// 软删除未删除的父记录，返回是否有记录被标记
    ///
    /// `cascade` 为 true 时同时标记其变体事件。
    async fn soft_delete(&self, id: i64, cascade: bool) -> Result<bool>;

    /// 列出父记录下未删除的变体事件，按 id 升序
    async fn list_events(&self, study_id: i64) -> Result<Vec<VariantEvent>>;

    /// 存储可用性检查
    async fn health_check(&self) -> Result<()>;
}
