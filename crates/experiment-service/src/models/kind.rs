//! 实验族定义
//!
//! Test 与 Experiment 两组父子表结构完全相同，只在表名、外键列名和
//! 附加元数据上不同。`StudyKind` 把这些差异收拢成类型参数，仓储、服务、
//! 处理器和路由都只实现一次。

use std::fmt::Debug;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use validator::{Validate, ValidationErrors};

/// 实验族
///
/// 关联常量同时用作 SQL 表名、URL 路径段和 JSON 键名：
/// `TABLE` 为创建响应中的记录键，`DATA_TABLE` 为事件列表键，
/// `FOREIGN_KEY` 为指标响应中的 id 键。
pub trait StudyKind: Debug + Clone + Copy + Send + Sync + 'static {
    /// 展示名，用于错误信息（如 "Test not found"）
    const LABEL: &'static str;
    /// 父表名
    const TABLE: &'static str;
    /// 变体事件表名
    const DATA_TABLE: &'static str;
    /// 事件表指向父表的外键列
    const FOREIGN_KEY: &'static str;

    /// 父记录上的附加元数据，以 JSONB 存储，不参与任何计算
    type Details: Serialize
        + DeserializeOwned
        + Validate
        + Debug
        + Clone
        + Default
        + Send
        + Sync
        + 'static;
}

/// A/B 测试
#[derive(Debug, Clone, Copy)]
pub struct TestKind;

impl StudyKind for TestKind {
    const LABEL: &'static str = "Test";
    const TABLE: &'static str = "test";
    const DATA_TABLE: &'static str = "test_data";
    const FOREIGN_KEY: &'static str = "test_id";

    type Details = TestDetails;
}

/// 实验
#[derive(Debug, Clone, Copy)]
pub struct ExperimentKind;

impl StudyKind for ExperimentKind {
    const LABEL: &'static str = "Experiment";
    const TABLE: &'static str = "experiment";
    const DATA_TABLE: &'static str = "experiment_data";
    const FOREIGN_KEY: &'static str = "experiment_id";

    type Details = ExperimentDesign;
}

/// A/B 测试没有附加元数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestDetails {}

impl Validate for TestDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// 实验设计元数据
///
/// 只做存储和回显，显著性、功效等字段不会被用于任何统计计算。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ExperimentDesign {
    #[validate(length(max = 100, message = "goal_metric must be at most 100 characters"))]
    pub goal_metric: Option<String>,
    pub desired_outcome: Option<String>,
    pub null_hypothesis: Option<String>,
    pub alternative_hypothesis: Option<String>,
    #[validate(range(min = 0, message = "sample_size_group_a must not be negative"))]
    pub sample_size_group_a: Option<i64>,
    #[validate(range(min = 0, message = "sample_size_group_b must not be negative"))]
    pub sample_size_group_b: Option<i64>,
    #[validate(range(min = 0.0, max = 1.0, message = "significance_level must be within 0..=1"))]
    pub significance_level: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0, message = "power must be within 0..=1"))]
    pub power: Option<f64>,
    pub bias_control_method: Option<String>,
    pub identified_confounders: Option<String>,
    pub success_metrics: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_constants() {
        assert_eq!(TestKind::TABLE, "test");
        assert_eq!(TestKind::DATA_TABLE, "test_data");
        assert_eq!(TestKind::FOREIGN_KEY, "test_id");
        assert_eq!(ExperimentKind::LABEL, "Experiment");
        assert_eq!(ExperimentKind::FOREIGN_KEY, "experiment_id");
    }

    #[test]
    fn test_experiment_design_validation() {
        let valid = ExperimentDesign {
            significance_level: Some(0.05),
            power: Some(0.8),
            sample_size_group_a: Some(1000),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let invalid = ExperimentDesign {
            significance_level: Some(1.5),
            ..Default::default()
        };
        assert!(invalid.validate().is_err());

        let negative = ExperimentDesign {
            sample_size_group_b: Some(-1),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_experiment_design_missing_fields_default_to_none() {
        let design: ExperimentDesign =
            serde_json::from_value(serde_json::json!({"goal_metric": "conversion_rate"})).unwrap();
        assert_eq!(design.goal_metric.as_deref(), Some("conversion_rate"));
        assert!(design.power.is_none());
    }
}
