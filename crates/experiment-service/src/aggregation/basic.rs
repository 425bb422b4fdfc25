//! 基础变体指标聚合
//!
//! 对同一实验下的变体事件做一次线性折叠：按变体标签分组，累加收入、
//! 转化次数、事件数和参与时长，折叠结束后再派生转化率与平均参与时长。
//! 纯函数，无 I/O，可在任意线程调用。

use std::collections::HashMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::models::VariantEvent;

/// 可被聚合的单条观测
pub trait VariantOutcome {
    fn variant(&self) -> &str;
    fn converted(&self) -> bool;
    fn revenue(&self) -> f64;
    fn engagement_minutes(&self) -> f64;
}

impl VariantOutcome for VariantEvent {
    fn variant(&self) -> &str {
        &self.variant
    }

    fn converted(&self) -> bool {
        self.conversion
    }

    fn revenue(&self) -> f64 {
        self.revenue
    }

    fn engagement_minutes(&self) -> f64 {
        self.engagement_minutes
    }
}

/// 单个变体的累加器
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VariantAccumulator {
    pub total_revenue: f64,
    pub total_conversion: u64,
    pub total_entries: u64,
    pub total_engagement_minutes: f64,
}

impl VariantAccumulator {
    pub fn record<E: VariantOutcome + ?Sized>(&mut self, event: &E) {
        self.total_revenue += event.revenue();
        self.total_conversion += u64::from(event.converted());
        self.total_entries += 1;
        self.total_engagement_minutes += event.engagement_minutes();
    }

    /// 派生比率字段
    ///
    /// 经由折叠产生的分组至少有一条事件；空累加器的比率按 0.0 处理。
    pub fn finish(self) -> VariantMetrics {
        let (conversion_rate, average_engagement_minutes) = if self.total_entries > 0 {
            let entries = self.total_entries as f64;
            (
                (self.total_conversion as f64 / entries) * 100.0,
                self.total_engagement_minutes / entries,
            )
        } else {
            (0.0, 0.0)
        };

        VariantMetrics {
            total_revenue: self.total_revenue,
            total_conversion: self.total_conversion,
            total_entries: self.total_entries,
            total_engagement_minutes: self.total_engagement_minutes,
            conversion_rate,
            average_engagement_minutes,
        }
    }
}

/// 单个变体的汇总指标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariantMetrics {
    pub total_revenue: f64,
    pub total_conversion: u64,
    pub total_entries: u64,
    pub total_engagement_minutes: f64,
    /// 百分比，0..=100
    pub conversion_rate: f64,
    pub average_engagement_minutes: f64,
}

/// 变体标签到汇总指标的映射，按标签首次出现的顺序排列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicMetrics {
    groups: Vec<(String, VariantMetrics)>,
}

impl BasicMetrics {
    pub fn get(&self, variant: &str) -> Option<&VariantMetrics> {
        self.groups
            .iter()
            .find(|(label, _)| label == variant)
            .map(|(_, metrics)| metrics)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(label, _)| label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantMetrics)> {
        self.groups
            .iter()
            .map(|(label, metrics)| (label.as_str(), metrics))
    }
}

impl Serialize for BasicMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (label, metrics) in &self.groups {
            map.serialize_entry(label, metrics)?;
        }
        map.end()
    }
}

/// 计算每个变体的基础指标
///
/// 事件顺序不影响各分组的数值，只决定输出中分组的排列顺序。
pub fn compute_basic_metrics<'a, E, I>(events: I) -> BasicMetrics
where
    E: VariantOutcome + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, VariantAccumulator)> = Vec::new();

    for event in events {
        let slot = *index.entry(event.variant()).or_insert_with(|| {
            groups.push((event.variant(), VariantAccumulator::default()));
            groups.len() - 1
        });
        groups[slot].1.record(event);
    }

    BasicMetrics {
        groups: groups
            .into_iter()
            .map(|(label, acc)| (label.to_string(), acc.finish()))
            .collect(),
    }
}
