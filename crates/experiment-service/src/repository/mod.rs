//! 数据访问层
//!
//! - `traits`: 仓储接口
//! - `study_repo`: PostgreSQL 实现
//! - `memory_repo`: 内存实现

mod memory_repo;
mod study_repo;
mod traits;

pub use memory_repo::InMemoryStudyRepository;
pub use study_repo::PgStudyRepository;
pub use traits::StudyRepository;

#[cfg(test)]
pub use traits::MockStudyRepository;
