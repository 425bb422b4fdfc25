//! 可观测性模块集成测试
//!
//! 未安装 recorder 时指标调用应为空操作，不能 panic。

// ============================================================================
// 指标记录测试
// ============================================================================

mod metrics_tests {
    use abtest_shared::observability::metrics::{
        record_basic_metrics, record_http_request, record_study_created, record_study_deleted,
    };

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/test/{id}", 200, 0.01);
        record_http_request("POST", "/experiment/", 200, 0.12);
        record_http_request("DELETE", "/test/{id}", 404, 0.003);
        record_http_request("POST", "/test/", 422, 0.002);
        record_http_request("GET", "/api/test/{id}/metrics/basic", 500, 0.25);
    }

    #[test]
    fn test_record_study_lifecycle() {
        record_study_created("test", 2);
        record_study_created("experiment", 0);
        record_study_deleted("test");
        record_study_deleted("experiment");
    }

    #[test]
    fn test_record_basic_metrics_edge_cases() {
        record_basic_metrics("test", 0);
        record_basic_metrics("experiment", 1);
        record_basic_metrics("test", 10_000);
        record_http_request("", "", 0, 0.0);
        record_http_request("GET", "/", 200, f64::MAX);
    }
}

// ============================================================================
// 中间件类型测试
// ============================================================================

mod middleware_tests {
    use abtest_shared::observability::middleware::RequestId;

    #[test]
    fn test_request_id_accessors() {
        let id = RequestId("req-123".to_string());
        assert_eq!(id.as_str(), "req-123");
        assert_eq!(id.clone().0, "req-123");
        assert!(format!("{:?}", id).contains("req-123"));
    }
}

// ============================================================================
// 配置测试
// ============================================================================

mod config_tests {
    use abtest_shared::config::AppConfig;
    use abtest_shared::observability::ObservabilityConfig;

    #[test]
    fn test_default_observability_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "unknown-service");
        assert!(config.metrics_enabled);
        assert_eq!(config.metrics_port, 9090);
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_service_name_is_injected() {
        let app = AppConfig {
            service_name: "experiment-service".to_string(),
            ..Default::default()
        };
        assert_eq!(app.observability_config().service_name, "experiment-service");
    }

    #[test]
    fn test_in_memory_is_off_by_default() {
        let app = AppConfig::default();
        assert!(!app.database.in_memory);
        assert!(app.database.run_migrations);
        assert!(!app.is_production());
    }
}

// ============================================================================
// 守卫测试
// ============================================================================

mod guard_tests {
    use abtest_shared::observability::ObservabilityGuard;

    #[test]
    fn test_empty_guard() {
        let guard = ObservabilityGuard::empty();
        drop(guard);
    }
}
