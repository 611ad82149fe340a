// ==========================================
// 班级课表排课系统 - 角色权限表
// ==========================================
// 职责: 角色 → 可执行操作 的静态能力表
// 红线: 与分配引擎完全解耦, 引擎不感知角色
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{Operation, Role};

/// 静态访问策略
pub struct AccessPolicy;

impl AccessPolicy {
    /// 角色是否允许执行操作
    ///
    /// # 规则
    /// - Admin: 全部操作
    /// - CurriculumManager: 查看主数据、维护课程、查看课表
    /// - Scheduler: 排课、删除条目、学期管理、维护课程、查看
    /// - Teacher / Student: 仅查看课表
    /// - 清空班级学期课表仅 Admin
    pub fn allows(role: Role, operation: Operation) -> bool {
        use Operation::*;

        match role {
            Role::Admin => true,
            Role::CurriculumManager => {
                matches!(operation, ViewMasterData | ManageSubjects | ViewTimetable)
            }
            Role::Scheduler => matches!(
                operation,
                ProposeAllocation
                    | RemoveAllocation
                    | ManageTerms
                    | ManageSubjects
                    | ViewTimetable
                    | ViewMasterData
            ),
            Role::Teacher | Role::Student => matches!(operation, ViewTimetable),
        }
    }

    /// 校验权限, 不允许时返回 PermissionDenied
    pub fn authorize(role: Role, operation: Operation) -> ApiResult<()> {
        if Self::allows(role, operation) {
            Ok(())
        } else {
            tracing::warn!(role = %role, operation = %operation, "权限不足");
            Err(ApiError::PermissionDenied { role, operation })
        }
    }
}
