//! 系统端点：根路径、存活与就绪检查

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{SERVICE_NAME, dto::MessageResponse, state::AppState};

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello World",
    })
}

/// 存活检查：服务进程正常即返回 ok
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// 就绪检查：检查两个实验族的存储是否可用
pub async fn readiness_check(State(state): State<AppState>) -> Json<Value> {
    let tests_ok = state.tests.health_check().await.is_ok();
    let experiments_ok = state.experiments.health_check().await.is_ok();
    let all_ok = tests_ok && experiments_ok;

    Json(json!({
        "status": if all_ok { "ok" } else { "degraded" },
        "service": SERVICE_NAME,
        "checks": {
            "test_store": if tests_ok { "ok" } else { "fail" },
            "experiment_store": if experiments_ok { "ok" } else { "fail" }
        }
    }))
}
