//! 业务服务层

mod study_service;

pub use study_service::StudyService;
