//! 领域模型
//!
//! - `kind`: 实验族（Test / Experiment）及各自的附加元数据
//! - `study`: 父记录与变体事件实体

mod kind;
mod study;

pub use kind::{ExperimentDesign, ExperimentKind, StudyKind, TestDetails, TestKind};
pub use study::{NewStudy, NewVariantEvent, Study, StudyRow, VariantEvent};
