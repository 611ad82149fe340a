// ==========================================
// 班级课表排课系统 - API 层
// ==========================================
// 职责: 对外业务接口 (命令行及各视图共用)
// 红线: API 层只做参数校验与编排, 排课规则在引擎层
// ==========================================

pub mod access;
pub mod error;
pub mod schedule_api;
pub mod subject_api;
pub mod term_api;

// 重导出
pub use access::AccessPolicy;
pub use error::{ApiError, ApiResult};
pub use schedule_api::{ProposeInput, ScheduleApi};
pub use subject_api::SubjectApi;
pub use term_api::TermApi;
