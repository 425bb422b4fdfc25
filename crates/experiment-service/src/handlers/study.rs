//! 实验 API 处理器
//!
//! 两个实验族共用这组泛型 handler，路由注册时按族实例化

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    dto::{CreateStudyRequest, CreatedStudy, DeletedResponse, StudyMetrics},
    error::StudyError,
    models::{Study, StudyKind},
    service::StudyService,
};

/// 创建实验及其变体事件
///
/// POST /{test|experiment}/
pub async fn create_study<K: StudyKind>(
    State(service): State<StudyService<K>>,
    Json(req): Json<CreateStudyRequest<K>>,
) -> Result<Json<CreatedStudy<K>>, StudyError> {
    let created = service.create(req).await?;
    Ok(Json(created))
}

/// 获取实验详情
///
/// GET /{test|experiment}/{id}
pub async fn get_study<K: StudyKind>(
    State(service): State<StudyService<K>>,
    Path(id): Path<i64>,
) -> Result<Json<Study<K>>, StudyError> {
    let study = service.get(id).await?;
    Ok(Json(study))
}

/// 软删除实验
///
/// DELETE /{test|experiment}/{id}
pub async fn delete_study<K: StudyKind>(
    State(service): State<StudyService<K>>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, StudyError> {
    service.soft_delete(id).await?;
    Ok(Json(DeletedResponse::for_kind::<K>()))
}

/// 按变体分组的基础指标
///
/// GET /api/{test|experiment}/{id}/metrics/basic
pub async fn basic_metrics<K: StudyKind>(
    State(service): State<StudyService<K>>,
    Path(id): Path<i64>,
) -> Result<Json<StudyMetrics<K>>, StudyError> {
    let metrics = service.basic_metrics(id).await?;
    Ok(Json(metrics))
}
