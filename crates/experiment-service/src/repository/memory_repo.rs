//! 内存实验仓储
//!
//! 基于 DashMap，供本地开发和接口测试使用，行为与 PostgreSQL 实现一致：
//! 自增 id、软删除、可选级联。

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::traits::StudyRepository;
use crate::error::Result;
use crate::models::{NewStudy, NewVariantEvent, Study, StudyKind, VariantEvent};

/// 内存实验仓储
///
/// clone 后共享同一份数据。
pub struct InMemoryStudyRepository<K: StudyKind> {
    studies: Arc<DashMap<i64, Study<K>>>,
    events: Arc<DashMap<i64, Vec<VariantEvent>>>,
    next_study_id: Arc<AtomicI64>,
    next_event_id: Arc<AtomicI64>,
}

impl<K: StudyKind> InMemoryStudyRepository<K> {
    pub fn new() -> Self {
        Self {
            studies: Arc::new(DashMap::new()),
            events: Arc::new(DashMap::new()),
            next_study_id: Arc::new(AtomicI64::new(1)),
            next_event_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// 当前保存的父记录总数（含已软删除）
    pub fn count(&self) -> usize {
        self.studies.len()
    }
}

impl<K: StudyKind> Default for InMemoryStudyRepository<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StudyKind> Clone for InMemoryStudyRepository<K> {
    fn clone(&self) -> Self {
        Self {
            studies: Arc::clone(&self.studies),
            events: Arc::clone(&self.events),
            next_study_id: Arc::clone(&self.next_study_id),
            next_event_id: Arc::clone(&self.next_event_id),
        }
    }
}

#[async_trait]
impl<K: StudyKind> StudyRepository<K> for InMemoryStudyRepository<K> {
    async fn create_with_events(
        &self,
        study: NewStudy<K>,
        events: Vec<NewVariantEvent>,
    ) -> Result<(Study<K>, Vec<VariantEvent>)> {
        let now = Utc::now();
        let id = self.next_study_id.fetch_add(1, Ordering::SeqCst);
        let study = study.into_study(id, now);

        let created: Vec<VariantEvent> = events
            .into_iter()
            .map(|event| {
                let event_id = self.next_event_id.fetch_add(1, Ordering::SeqCst);
                event.into_event(event_id, id, now)
            })
            .collect();

        // 事件先于父记录可见，读取方只能通过父记录找到它们
        self.events.insert(id, created.clone());
        self.studies.insert(id, study.clone());

        Ok((study, created))
    }

    async fn find_active(&self, id: i64) -> Result<Option<Study<K>>> {
        Ok(self
            .studies
            .get(&id)
            .filter(|study| !study.is_deleted())
            .map(|study| study.clone()))
    }

    async fn soft_delete(&self, id: i64, cascade: bool) -> Result<bool> {
        let now = Utc::now();
        {
            let Some(mut study) = self.studies.get_mut(&id) else {
                return Ok(false);
            };
            if study.is_deleted() {
                return Ok(false);
            }
            study.deleted_at = Some(now);
            study.updated_at = now;
        }

        if cascade {
            if let Some(mut events) = self.events.get_mut(&id) {
                for event in events.iter_mut().filter(|e| e.deleted_at.is_none()) {
                    event.deleted_at = Some(now);
                    event.updated_at = now;
                }
            }
        }

        Ok(true)
    }

    async fn list_events(&self, study_id: i64) -> Result<Vec<VariantEvent>> {
        Ok(self
            .events
            .get(&study_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.deleted_at.is_none())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
