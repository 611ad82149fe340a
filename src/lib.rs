// ==========================================
// 班级课表排课系统 - 核心库
// ==========================================
// 职责: 时段分配与冲突检测 (班级/教师/教室三个资源维度)
// 技术栈: Rust + SQLite
// 系统定位: 人工排课的校验核心 (不做自动排课)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排课规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AllocationRequest, Day, Operation, ResourceAxis, Role, ScheduleEntry, SlotRange, Subject,
    Term, Timetable, TimetableCell, TimetableOwner,
};

// 引擎
pub use engine::{AllocationEngine, AllocationError, EntryStore, RejectReason, SubjectLookup};

// API
pub use api::{AccessPolicy, ApiError, ApiResult, ProposeInput, ScheduleApi, SubjectApi, TermApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "班级课表排课系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
