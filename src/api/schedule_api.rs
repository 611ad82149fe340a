// ==========================================
// 班级课表排课系统 - 排课 API
// ==========================================
// 职责: 所有视图 (班级/教师/教室/命令行) 共用的唯一排课入口
// 红线: 学期未显式给出时, 每次调用都从持久化配置读取当前学期
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::{AllocationRequest, Day, ScheduleEntry, Timetable, TimetableOwner};
use crate::engine::AllocationEngine;
use crate::repository::{ScheduleEntryRepository, SubjectRepository};

// ==========================================
// ProposeInput - 排课输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeInput {
    pub day: Day,
    pub start_slot: i32,
    #[serde(default)]
    pub term: Option<String>, // 为空时使用当前学期
    pub group_id: String,
    pub subject_code: String, // 课程代码或 BREAK
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

// ==========================================
// ScheduleApi - 排课 API
// ==========================================
pub struct ScheduleApi {
    engine: Arc<AllocationEngine>,
    entry_repo: Arc<ScheduleEntryRepository>,
    subject_repo: Arc<SubjectRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ScheduleApi {
    /// 创建新的ScheduleApi实例
    pub fn new(
        engine: Arc<AllocationEngine>,
        entry_repo: Arc<ScheduleEntryRepository>,
        subject_repo: Arc<SubjectRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            engine,
            entry_repo,
            subject_repo,
            config_manager,
        }
    }

    /// 解析学期: 显式给出时去空白, 否则读取当前学期
    fn resolve_term(&self, term: Option<&str>) -> ApiResult<String> {
        match term {
            Some(t) => {
                let trimmed = t.trim();
                if trimmed.is_empty() {
                    return Err(ApiError::InvalidInput("学期不能为空".to_string()));
                }
                Ok(trimmed.to_string())
            }
            None => Ok(self.config_manager.get_current_term()?),
        }
    }

    /// 空字符串视为未指定
    fn normalize_optional(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// 提交排课提议
    ///
    /// # 返回
    /// - Ok(ScheduleEntry): 已写入的新条目
    /// - Err(ApiError::Rejected): 排课被拒绝 (未写入任何数据)
    /// - Err(ApiError::InvalidInput): 班级/课程/学期为空
    pub fn propose_allocation(&self, input: ProposeInput) -> ApiResult<ScheduleEntry> {
        // 参数验证
        let group_id = input.group_id.trim().to_string();
        if group_id.is_empty() {
            return Err(ApiError::InvalidInput("班级不能为空".to_string()));
        }
        let subject_code = input.subject_code.trim().to_string();
        if subject_code.is_empty() {
            return Err(ApiError::InvalidInput("课程代码不能为空".to_string()));
        }
        let term = self.resolve_term(input.term.as_deref())?;

        let request = AllocationRequest {
            day: input.day,
            start_slot: input.start_slot,
            term,
            group_id,
            subject_code,
            teacher_id: Self::normalize_optional(input.teacher_id),
            room_id: Self::normalize_optional(input.room_id),
        };

        let entry = self.engine.allocate(
            &request,
            self.subject_repo.as_ref(),
            self.entry_repo.as_ref(),
        )?;
        Ok(entry)
    }

    /// 删除单个条目
    ///
    /// # 返回
    /// - Ok(String): 被删除条目所属学期 (便于调用方返回该学期视图)
    /// - Err(ApiError::NotFound): 条目不存在
    pub fn remove_allocation(&self, entry_id: &str) -> ApiResult<String> {
        let entry = self
            .entry_repo
            .find_by_id(entry_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排课条目(id={})不存在", entry_id)))?;

        if !self
            .engine
            .remove_allocation(self.entry_repo.as_ref(), entry_id)?
        {
            return Err(ApiError::NotFound(format!("排课条目(id={})不存在", entry_id)));
        }

        Ok(entry.term)
    }

    /// 清空班级在某学期的全部条目
    pub fn clear_allocations(&self, group_id: &str, term: Option<&str>) -> ApiResult<usize> {
        let group_id = group_id.trim();
        if group_id.is_empty() {
            return Err(ApiError::InvalidInput("班级不能为空".to_string()));
        }
        let term = self.resolve_term(term)?;

        Ok(self
            .engine
            .clear_allocations(self.entry_repo.as_ref(), group_id, &term)?)
    }

    /// 按ID查询条目
    pub fn get_allocation(&self, entry_id: &str) -> ApiResult<Option<ScheduleEntry>> {
        Ok(self.entry_repo.find_by_id(entry_id)?)
    }

    // ===== 课表视图 =====

    /// 班级周课表
    pub fn group_timetable(&self, group_id: &str, term: Option<&str>) -> ApiResult<Timetable> {
        let term = self.resolve_term(term)?;
        let entries = self.entry_repo.find_by_group_and_term(group_id, &term)?;
        Ok(Timetable::build(
            TimetableOwner::Group(group_id.to_string()),
            &term,
            &entries,
        ))
    }

    /// 教师周课表
    pub fn teacher_timetable(&self, teacher_id: &str, term: Option<&str>) -> ApiResult<Timetable> {
        let term = self.resolve_term(term)?;
        let entries = self.entry_repo.find_by_teacher_and_term(teacher_id, &term)?;
        Ok(Timetable::build(
            TimetableOwner::Teacher(teacher_id.to_string()),
            &term,
            &entries,
        ))
    }

    /// 教室周课表
    pub fn room_timetable(&self, room_id: &str, term: Option<&str>) -> ApiResult<Timetable> {
        let term = self.resolve_term(term)?;
        let entries = self.entry_repo.find_by_room_and_term(room_id, &term)?;
        Ok(Timetable::build(
            TimetableOwner::Room(room_id.to_string()),
            &term,
            &entries,
        ))
    }
}
