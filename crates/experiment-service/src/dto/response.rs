//! 响应 DTO 定义
//!
//! 创建响应与指标响应的 JSON 键随实验族变化（`test` / `test_data` /
//! `test_id` 等），因此手工实现 Serialize。

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::aggregation::BasicMetrics;
use crate::models::{Study, StudyKind, VariantEvent};

/// 创建实验响应：`{"test": {...}, "test_data": [...]}`
#[derive(Debug, Clone)]
pub struct CreatedStudy<K: StudyKind> {
    pub study: Study<K>,
    pub events: Vec<VariantEvent>,
}

impl<K: StudyKind> Serialize for CreatedStudy<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(K::TABLE, &self.study)?;
        map.serialize_entry(K::DATA_TABLE, &self.events)?;
        map.end()
    }
}

/// 基础指标响应：`{"test_id": 1, "metrics": {...}}`
#[derive(Debug, Clone)]
pub struct StudyMetrics<K: StudyKind> {
    pub study_id: i64,
    pub metrics: BasicMetrics,
    _kind: std::marker::PhantomData<K>,
}

impl<K: StudyKind> StudyMetrics<K> {
    pub fn new(study_id: i64, metrics: BasicMetrics) -> Self {
        Self {
            study_id,
            metrics,
            _kind: std::marker::PhantomData,
        }
    }
}

impl<K: StudyKind> Serialize for StudyMetrics<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(K::FOREIGN_KEY, &self.study_id)?;
        map.serialize_entry("metrics", &self.metrics)?;
        map.end()
    }
}

/// 删除成功响应：`{"message": "Test deleted successfully"}`
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

impl DeletedResponse {
    pub fn for_kind<K: StudyKind>() -> Self {
        Self {
            message: format!("{} deleted successfully", K::LABEL),
        }
    }
}

/// 根路径问候
#[derive(Debug, Clone, serde::Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::compute_basic_metrics;
    use crate::models::{ExperimentKind, NewStudy, NewVariantEvent, TestDetails, TestKind};
    use chrono::Utc;
    use serde_json::json;

    fn event(id: i64, variant: &str, conversion: bool) -> VariantEvent {
        NewVariantEvent {
            variant: variant.to_string(),
            timestamp: Utc::now(),
            conversion,
            revenue: 10.0,
            engagement_minutes: 2.0,
            additional_data: None,
        }
        .into_event(id, 1, Utc::now())
    }

    #[test]
    fn test_created_study_uses_family_keys() {
        let study = NewStudy::<TestKind> {
            name: "Landing page".to_string(),
            description: None,
            study_type: "conversion".to_string(),
            details: TestDetails::default(),
        }
        .into_study(1, Utc::now());

        let value = serde_json::to_value(CreatedStudy {
            study,
            events: vec![event(1, "A", true), event(2, "B", false)],
        })
        .unwrap();

        assert_eq!(value["test"]["name"], "Landing page");
        assert_eq!(value["test_data"].as_array().unwrap().len(), 2);
        assert_eq!(value["test_data"][0]["parent_id"], 1);
    }

    #[test]
    fn test_metrics_response_uses_foreign_key_name() {
        let events = vec![event(1, "A", true)];
        let response = StudyMetrics::<ExperimentKind>::new(9, compute_basic_metrics(&events));

        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["experiment_id"], 9);
        assert_eq!(value["metrics"]["A"]["total_entries"], 1);
        assert_eq!(value["metrics"]["A"]["conversion_rate"], 100.0);
    }

    #[test]
    fn test_deleted_message() {
        assert_eq!(
            serde_json::to_value(DeletedResponse::for_kind::<TestKind>()).unwrap(),
            json!({"message": "Test deleted successfully"})
        );
        assert_eq!(
            DeletedResponse::for_kind::<ExperimentKind>().message,
            "Experiment deleted successfully"
        );
    }
}
