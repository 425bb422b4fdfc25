//! 实验业务服务
//!
//! 负责创建、查询、软删除与基础指标计算。两个实验族共用同一实现，
//! 差异只体现在 `StudyKind` 的常量和附加元数据上。

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use abtest_shared::observability::metrics;

use crate::aggregation::compute_basic_metrics;
use crate::dto::{CreateStudyRequest, CreatedStudy, StudyMetrics};
use crate::error::{Result, StudyError};
use crate::models::{Study, StudyKind};
use crate::repository::StudyRepository;

/// 实验服务
pub struct StudyService<K: StudyKind> {
    repo: Arc<dyn StudyRepository<K>>,
    cascade_soft_delete: bool,
}

impl<K: StudyKind> Clone for StudyService<K> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            cascade_soft_delete: self.cascade_soft_delete,
        }
    }
}

impl<K: StudyKind> StudyService<K> {
    pub fn new(repo: Arc<dyn StudyRepository<K>>, cascade_soft_delete: bool) -> Self {
        Self {
            repo,
            cascade_soft_delete,
        }
    }

    /// 创建实验及其变体事件
    ///
    /// 父记录与全部事件在同一次仓储调用中写入，任一失败则整体不生效。
    #[instrument(skip(self, request), fields(family = K::TABLE, name = %request.name))]
    pub async fn create(&self, request: CreateStudyRequest<K>) -> Result<CreatedStudy<K>> {
        request.validate()?;

        let (study, events) = request.into_parts(Utc::now());
        let (study, events) = self.repo.create_with_events(study, events).await?;

        metrics::record_study_created(K::TABLE, events.len());
        info!(study_id = study.id, events = events.len(), "{} created", K::LABEL);

        Ok(CreatedStudy { study, events })
    }

    /// 获取未删除的实验
    #[instrument(skip(self), fields(family = K::TABLE))]
    pub async fn get(&self, id: i64) -> Result<Study<K>> {
        self.repo
            .find_active(id)
            .await?
            .ok_or_else(|| StudyError::not_found(K::LABEL, id))
    }

    /// 软删除实验，已删除或不存在时返回 NotFound
    #[instrument(skip(self), fields(family = K::TABLE))]
    pub async fn soft_delete(&self, id: i64) -> Result<()> {
        if !self.repo.soft_delete(id, self.cascade_soft_delete).await? {
            return Err(StudyError::not_found(K::LABEL, id));
        }

        metrics::record_study_deleted(K::TABLE);
        info!(
            study_id = id,
            cascade = self.cascade_soft_delete,
            "{} soft-deleted",
            K::LABEL
        );

        Ok(())
    }

    /// 按变体分组计算基础指标
    ///
    /// 父记录不存在或已删除时返回 NotFound，不会读取事件；
    /// 存在但没有事件时返回 NoData。
    #[instrument(skip(self), fields(family = K::TABLE))]
    pub async fn basic_metrics(&self, id: i64) -> Result<StudyMetrics<K>> {
        self.get(id).await?;

        let events = self.repo.list_events(id).await?;
        if events.is_empty() {
            return Err(StudyError::no_data(K::TABLE, id));
        }

        let metrics = compute_basic_metrics(&events);
        metrics::record_basic_metrics(K::TABLE, metrics.len());

        Ok(StudyMetrics::new(id, metrics))
    }

    /// 存储可用性检查
    pub async fn health_check(&self) -> Result<()> {
        self.repo.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ExperimentDesign, ExperimentKind, NewStudy, NewVariantEvent, TestDetails, TestKind,
        VariantEvent,
    };
    use crate::repository::MockStudyRepository;
    use mockall::predicate::eq;
    use serde_json::json;

    fn test_study(id: i64) -> Study<TestKind> {
        NewStudy::<TestKind> {
            name: "Landing page".to_string(),
            description: None,
            study_type: "engagement".to_string(),
            details: TestDetails::default(),
        }
        .into_study(id, Utc::now())
    }

    fn event(id: i64, variant: &str, conversion: bool, revenue: f64, minutes: f64) -> VariantEvent {
        NewVariantEvent {
            variant: variant.to_string(),
            timestamp: Utc::now(),
            conversion,
            revenue,
            engagement_minutes: minutes,
            additional_data: None,
        }
        .into_event(id, 1, Utc::now())
    }

    fn service(mock: MockStudyRepository<TestKind>, cascade: bool) -> StudyService<TestKind> {
        StudyService::new(Arc::new(mock), cascade)
    }

    fn request(value: serde_json::Value) -> CreateStudyRequest<TestKind> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_passes_all_events_to_repository() {
        let mut mock = MockStudyRepository::<TestKind>::new();
        mock.expect_create_with_events()
            .withf(|study, events| study.name == "Landing page" && events.len() == 2)
            .times(1)
            .returning(|study, events| {
                let study = study.into_study(1, Utc::now());
                let events = events
                    .into_iter()
                    .enumerate()
                    .map(|(i, e)| e.into_event(i as i64 + 1, 1, Utc::now()))
                    .collect();
                Ok((study, events))
            });

        let created = service(mock, false)
            .create(request(json!({
                "name": "Landing page",
                "type": "engagement",
                "variants": [
                    {"variant": "A", "conversion": false},
                    {"variant": "B", "conversion": true, "revenue": 100.0}
                ]
            })))
            .await
            .unwrap();

        assert_eq!(created.study.id, 1);
        assert_eq!(created.events.len(), 2);
        assert_eq!(created.events[1].revenue, 100.0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_request_before_repository() {
        let mut mock = MockStudyRepository::<TestKind>::new();
        mock.expect_create_with_events().never();

        let result = service(mock, false)
            .create(request(json!({"name": "x".repeat(51), "type": "t"})))
            .await;

        assert!(matches!(result, Err(StudyError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_missing_returns_not_found() {
        let mut mock = MockStudyRepository::<TestKind>::new();
        mock.expect_find_active()
            .with(eq(42))
            .returning(|_| Ok(None));

        let err = service(mock, false).get(42).await.unwrap_err();

        assert!(matches!(err, StudyError::NotFound { entity: "Test", id: 42 }));
        assert_eq!(err.to_string(), "Test not found");
    }

    #[tokio::test]
    async fn test_soft_delete_uses_configured_cascade() {
        for cascade in [false, true] {
            let mut mock = MockStudyRepository::<TestKind>::new();
            mock.expect_soft_delete()
                .with(eq(3), eq(cascade))
                .times(1)
                .returning(|_, _| Ok(true));

            assert!(service(mock, cascade).soft_delete(3).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_soft_delete_twice_is_not_found() {
        let mut mock = MockStudyRepository::<TestKind>::new();
        mock.expect_soft_delete().returning(|_, _| Ok(false));

        let err = service(mock, false).soft_delete(3).await.unwrap_err();
        assert!(matches!(err, StudyError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_metrics_for_missing_study_skips_event_lookup() {
        let mut mock = MockStudyRepository::<TestKind>::new();
        mock.expect_find_active().returning(|_| Ok(None));
        mock.expect_list_events().never();

        let err = service(mock, false).basic_metrics(5).await.unwrap_err();
        assert!(matches!(err, StudyError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_metrics_without_events_is_no_data() {
        let mut mock = MockStudyRepository::<TestKind>::new();
        mock.expect_find_active()
            .returning(|id| Ok(Some(test_study(id))));
        mock.expect_list_events().returning(|_| Ok(vec![]));

        let err = service(mock, false).basic_metrics(5).await.unwrap_err();

        assert!(matches!(err, StudyError::NoData { id: 5, .. }));
        assert_eq!(err.to_string(), "No data found for test 5");
    }

    #[tokio::test]
    async fn test_metrics_groups_by_variant() {
        let mut mock = MockStudyRepository::<TestKind>::new();
        mock.expect_find_active()
            .returning(|id| Ok(Some(test_study(id))));
        mock.expect_list_events().with(eq(1)).returning(|_| {
            Ok(vec![
                event(1, "A", false, 0.0, 0.0),
                event(2, "B", true, 100.0, 5.0),
            ])
        });

        let response = service(mock, false).basic_metrics(1).await.unwrap();

        assert_eq!(response.study_id, 1);
        assert_eq!(response.metrics.variants().collect::<Vec<_>>(), vec!["A", "B"]);
        let b = response.metrics.get("B").unwrap();
        assert_eq!(b.conversion_rate, 100.0);
        assert_eq!(b.total_revenue, 100.0);
        assert_eq!(b.average_engagement_minutes, 5.0);
    }

    #[tokio::test]
    async fn test_experiment_family_errors_use_experiment_names() {
        let mut mock = MockStudyRepository::<ExperimentKind>::new();
        mock.expect_find_active().returning(|id| {
            Ok(Some(
                NewStudy::<ExperimentKind> {
                    name: "Pricing".to_string(),
                    description: None,
                    study_type: "revenue".to_string(),
                    details: ExperimentDesign::default(),
                }
                .into_study(id, Utc::now()),
            ))
        });
        mock.expect_list_events().returning(|_| Ok(vec![]));

        let service = StudyService::<ExperimentKind>::new(Arc::new(mock), false);
        let err = service.basic_metrics(8).await.unwrap_err();

        assert_eq!(err.to_string(), "No data found for experiment 8");
    }
}
