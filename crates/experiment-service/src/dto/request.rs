//! 请求 DTO 定义

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::error::{Result, StudyError};
use crate::models::{NewStudy, NewVariantEvent, StudyKind};

/// 创建实验请求
///
/// 族特有的元数据字段与通用字段平铺在同一层 JSON 对象中。
/// 类型标签和变体列表同时接受原有的 `test_type` / `test_variants` 等写法。
#[derive(Debug, Deserialize)]
#[serde(bound = "")]
pub struct CreateStudyRequest<K: StudyKind> {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", alias = "test_type", alias = "experiment_type")]
    pub study_type: String,
    #[serde(
        default,
        alias = "test_variants",
        alias = "experiment_variants",
        alias = "test_data",
        alias = "experiment_data"
    )]
    pub variants: Vec<VariantPayload>,
    #[serde(flatten)]
    pub details: K::Details,
}

impl<K: StudyKind> CreateStudyRequest<K> {
    /// 校验请求字段，长度上限与表结构一致
    pub fn validate(&self) -> Result<()> {
        check_length("name", &self.name, 1, 50)?;
        if let Some(description) = &self.description {
            check_length("description", description, 0, 255)?;
        }
        check_length("type", &self.study_type, 1, 50)?;
        self.details.validate()?;
        for variant in &self.variants {
            variant.validate()?;
        }
        Ok(())
    }

    /// 拆分为父记录与变体事件，缺省时间戳取 `now`
    pub fn into_parts(self, now: DateTime<Utc>) -> (NewStudy<K>, Vec<NewVariantEvent>) {
        let study = NewStudy {
            name: self.name,
            description: self.description,
            study_type: self.study_type,
            details: self.details,
        };
        let events = self
            .variants
            .into_iter()
            .map(|payload| payload.into_new_event(now))
            .collect();
        (study, events)
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(StudyError::Validation(format!(
            "{field}: length must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

/// 单条变体事件
///
/// revenue 与 engagement_minutes 缺省或为 null 时按 0 记录；
/// 负值（退款、冲正）原样保留。
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VariantPayload {
    #[validate(length(min = 1, max = 50, message = "variant must be 1-50 characters"))]
    pub variant: String,
    pub conversion: bool,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub engagement_minutes: Option<f64>,
    #[serde(default)]
    pub additional_data: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl VariantPayload {
    pub fn into_new_event(self, now: DateTime<Utc>) -> NewVariantEvent {
        NewVariantEvent {
            variant: self.variant,
            timestamp: self.timestamp.unwrap_or(now),
            conversion: self.conversion,
            revenue: self.revenue.unwrap_or(0.0),
            engagement_minutes: self.engagement_minutes.unwrap_or(0.0),
            additional_data: self.additional_data,
        }
    }
}
