//! 路由配置模块
//!
//! 两个实验族的路由结构完全一致，由 `study_routes` 按族生成

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};

use crate::{
    handlers,
    models::{ExperimentKind, StudyKind, TestKind},
    service::StudyService,
    state::AppState,
};

/// 构建单个实验族的路由
///
/// - POST   /{table}/ 与 /{table}
/// - GET    /{table}/{id}
/// - DELETE /{table}/{id}
/// - GET    /api/{table}/{id}/metrics/basic
pub fn study_routes<K>() -> Router<AppState>
where
    K: StudyKind,
    StudyService<K>: FromRef<AppState>,
{
    let table = K::TABLE;

    Router::new()
        .route(
            &format!("/{table}/"),
            post(handlers::study::create_study::<K>),
        )
        .route(
            &format!("/{table}"),
            post(handlers::study::create_study::<K>),
        )
        .route(
            &format!("/{table}/{{id}}"),
            get(handlers::study::get_study::<K>).delete(handlers::study::delete_study::<K>),
        )
        .route(
            &format!("/api/{table}/{{id}}/metrics/basic"),
            get(handlers::study::basic_metrics::<K>),
        )
}

/// 系统路由
pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health_check))
        .route("/ready", get(handlers::system::readiness_check))
}

/// 构建完整的 API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(system_routes())
        .merge(study_routes::<TestKind>())
        .merge(study_routes::<ExperimentKind>())
}
