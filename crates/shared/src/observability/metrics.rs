//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 描述指标，出现在 /metrics 端点的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!("studies_created_total", "Total number of studies created");
    metrics::describe_counter!(
        "studies_deleted_total",
        "Total number of studies soft-deleted"
    );
    metrics::describe_counter!(
        "variant_events_recorded_total",
        "Total number of variant events recorded"
    );
    metrics::describe_counter!(
        "basic_metrics_computed_total",
        "Total number of basic metrics aggregations"
    );
    metrics::describe_histogram!(
        "basic_metrics_variants",
        "Number of variant groups per aggregation"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录实验创建及随之写入的变体事件数
#[inline]
pub fn record_study_created(family: &'static str, events: usize) {
    metrics::counter!("studies_created_total", "family" => family).increment(1);
    metrics::counter!("variant_events_recorded_total", "family" => family)
        .increment(events as u64);
}

/// 记录实验软删除
#[inline]
pub fn record_study_deleted(family: &'static str) {
    metrics::counter!("studies_deleted_total", "family" => family).increment(1);
}

/// 记录一次基础指标聚合
#[inline]
pub fn record_basic_metrics(family: &'static str, variants: usize) {
    metrics::counter!("basic_metrics_computed_total", "family" => family).increment(1);
    metrics::histogram!("basic_metrics_variants", "family" => family).record(variants as f64);
}
