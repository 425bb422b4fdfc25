//! 实验记录与变体事件实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kind::StudyKind;
use crate::error::Result;

/// 实验父记录（Test 或 Experiment）
///
/// `deleted_at` 非空表示已被软删除，对读取不可见。
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct Study<K: StudyKind> {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub study_type: String,
    #[serde(flatten)]
    pub details: K::Details,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl<K: StudyKind> Study<K> {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// 父表查询结果行，details 在转换为 `Study<K>` 时按族解析
#[derive(Debug, sqlx::FromRow)]
pub struct StudyRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub study_type: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StudyRow {
    pub fn into_study<K: StudyKind>(self) -> Result<Study<K>> {
        Ok(Study {
            id: self.id,
            name: self.name,
            description: self.description,
            study_type: self.study_type,
            details: serde_json::from_value(self.details)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

/// 待写入的父记录
#[derive(Debug, Clone)]
pub struct NewStudy<K: StudyKind> {
    pub name: String,
    pub description: Option<String>,
    pub study_type: String,
    pub details: K::Details,
}

impl<K: StudyKind> NewStudy<K> {
    /// 以给定 id 和时间戳落成完整记录（内存仓储使用）
    pub fn into_study(self, id: i64, now: DateTime<Utc>) -> Study<K> {
        Study {
            id,
            name: self.name,
            description: self.description,
            study_type: self.study_type,
            details: self.details,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// 变体事件记录
///
/// 一条观测结果：某个变体下是否转化、产生的收入和参与时长。
/// `deleted_at` 只会在开启级联软删除时被设置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VariantEvent {
    pub id: i64,
    pub parent_id: i64,
    pub variant: String,
    pub timestamp: DateTime<Utc>,
    pub conversion: bool,
    pub revenue: f64,
    pub engagement_minutes: f64,
    pub additional_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// 待写入的变体事件，缺省值已在请求层补齐
#[derive(Debug, Clone, PartialEq)]
pub struct NewVariantEvent {
    pub variant: String,
    pub timestamp: DateTime<Utc>,
    pub conversion: bool,
    pub revenue: f64,
    pub engagement_minutes: f64,
    pub additional_data: Option<Value>,
}

impl NewVariantEvent {
    pub fn into_event(self, id: i64, parent_id: i64, now: DateTime<Utc>) -> VariantEvent {
        VariantEvent {
            id,
            parent_id,
            variant: self.variant,
            timestamp: self.timestamp,
            conversion: self.conversion,
            revenue: self.revenue,
            engagement_minutes: self.engagement_minutes,
            additional_data: self.additional_data,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}
