//! 共享库
//!
//! 包含服务共用的配置、基础设施错误、数据库连接与可观测性代码。

pub mod config;
pub mod database;
pub mod error;
pub mod observability;
