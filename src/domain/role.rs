// ==========================================
// 班级课表排课系统 - 角色与操作
// ==========================================
// 职责: 封闭的角色枚举 + 受控操作枚举
// 红线: 与分配引擎完全解耦, 引擎不感知身份
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 角色 (Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,             // 系统管理员
    CurriculumManager, // 专业负责人
    Scheduler,         // 排课员
    Teacher,           // 教师
    Student,           // 学生
}

impl Role {
    /// 从字符串解析（兼容旧值 program_manager）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "curriculum_manager" | "program_manager" => Some(Role::CurriculumManager),
            "scheduler" => Some(Role::Scheduler),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::CurriculumManager => "curriculum_manager",
            Role::Scheduler => "scheduler",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 受控操作 (Operation)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    ViewTimetable,    // 查看课表
    ProposeAllocation, // 排课
    RemoveAllocation, // 删除单个条目
    ClearAllocations, // 清空班级学期课表
    ManageSubjects,   // 维护课程
    ManageTerms,      // 新增学期 / 设置当前学期
    ViewMasterData,   // 查看课程与学期
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::ViewTimetable => "VIEW_TIMETABLE",
            Operation::ProposeAllocation => "PROPOSE_ALLOCATION",
            Operation::RemoveAllocation => "REMOVE_ALLOCATION",
            Operation::ClearAllocations => "CLEAR_ALLOCATIONS",
            Operation::ManageSubjects => "MANAGE_SUBJECTS",
            Operation::ManageTerms => "MANAGE_TERMS",
            Operation::ViewMasterData => "VIEW_MASTER_DATA",
        };
        write!(f, "{}", s)
    }
}
