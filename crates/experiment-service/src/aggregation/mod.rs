//! 变体指标聚合

mod basic;

pub use basic::{
    BasicMetrics, VariantAccumulator, VariantMetrics, VariantOutcome, compute_basic_metrics,
};
