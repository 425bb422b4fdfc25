//! 应用状态定义
//!
//! 每个实验族一个服务实例，handler 通过 `FromRef` 按族取用

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use abtest_shared::config::StudyConfig;

use crate::models::{ExperimentKind, TestKind};
use crate::repository::{InMemoryStudyRepository, PgStudyRepository};
use crate::service::StudyService;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub tests: StudyService<TestKind>,
    pub experiments: StudyService<ExperimentKind>,
}

impl AppState {
    pub fn new(
        tests: StudyService<TestKind>,
        experiments: StudyService<ExperimentKind>,
    ) -> Self {
        Self { tests, experiments }
    }

    /// 基于 PostgreSQL 连接池构建
    pub fn postgres(pool: PgPool, config: &StudyConfig) -> Self {
        Self::new(
            StudyService::new(
                Arc::new(PgStudyRepository::<TestKind>::new(pool.clone())),
                config.cascade_soft_delete,
            ),
            StudyService::new(
                Arc::new(PgStudyRepository::<ExperimentKind>::new(pool)),
                config.cascade_soft_delete,
            ),
        )
    }

    /// 基于进程内存储构建，数据随进程退出丢失
    pub fn in_memory(config: &StudyConfig) -> Self {
        Self::new(
            StudyService::new(
                Arc::new(InMemoryStudyRepository::<TestKind>::new()),
                config.cascade_soft_delete,
            ),
            StudyService::new(
                Arc::new(InMemoryStudyRepository::<ExperimentKind>::new()),
                config.cascade_soft_delete,
            ),
        )
    }
}

impl FromRef<AppState> for StudyService<TestKind> {
    fn from_ref(state: &AppState) -> Self {
        state.tests.clone()
    }
}

impl FromRef<AppState> for StudyService<ExperimentKind> {
    fn from_ref(state: &AppState) -> Self {
        state.experiments.clone()
    }
}
