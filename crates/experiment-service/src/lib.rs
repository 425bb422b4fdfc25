//! A/B 实验记录服务
//!
//! 记录 A/B 测试与实验的变体事件，并按变体汇总基础指标。
//!
//! ## 核心功能
//!
//! - **实验记录**：创建、查询、软删除 Test 与 Experiment 两个实验族
//! - **变体事件**：随实验一起原子写入的逐条观测（转化、收入、参与时长）
//! - **基础指标**：按变体标签分组计算总量、转化率和平均参与时长
//!
//! ## 模块结构
//!
//! - `models`: 实验族定义与实体
//! - `aggregation`: 变体指标聚合（纯计算，无 I/O）
//! - `repository`: 数据访问层（PostgreSQL / 内存）
//! - `service`: 业务服务
//! - `dto`: 请求和响应的数据传输对象
//! - `handlers` / `routes` / `state`: HTTP 层
//! - `error`: 错误类型定义

pub mod aggregation;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

/// 服务名，用于配置加载与健康检查响应
pub const SERVICE_NAME: &str = "experiment-service";

pub use aggregation::{BasicMetrics, VariantMetrics, compute_basic_metrics};
pub use error::{Result, StudyError};
pub use models::{ExperimentKind, Study, StudyKind, TestKind, VariantEvent};
pub use service::StudyService;
pub use state::AppState;
