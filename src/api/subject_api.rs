// ==========================================
// 班级课表排课系统 - 课程 API
// ==========================================
// 职责: 课程主数据维护 (排课时长来源)
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::slot::is_break_code;
use crate::domain::Subject;
use crate::repository::SubjectRepository;

pub struct SubjectApi {
    subject_repo: Arc<SubjectRepository>,
}

impl SubjectApi {
    pub fn new(subject_repo: Arc<SubjectRepository>) -> Self {
        Self { subject_repo }
    }

    /// 新增或更新课程
    ///
    /// 学时为负视为无效输入; 合计为 0 允许保存, 排课时由引擎拒绝。
    /// 休息课代码 (BREAK, 不区分大小写) 为保留代码, 不能作为课程保存
    pub fn upsert_subject(&self, subject: Subject) -> ApiResult<()> {
        if subject.subject_code.trim().is_empty() {
            return Err(ApiError::InvalidInput("课程代码不能为空".to_string()));
        }

        if is_break_code(&subject.subject_code) {
            return Err(ApiError::InvalidInput(format!(
                "课程代码{}为休息课保留代码",
                subject.subject_code
            )));
        }

        if subject.theory_hrs < 0 || subject.practice_hrs < 0 {
            return Err(ApiError::InvalidInput(format!(
                "课程{}学时不能为负: theory={}, practice={}",
                subject.subject_code, subject.theory_hrs, subject.practice_hrs
            )));
        }

        self.subject_repo.upsert(&subject)?;
        tracing::info!(subject_code = %subject.subject_code, duration = subject.duration(), "课程已保存");
        Ok(())
    }

    pub fn get_subject(&self, subject_code: &str) -> ApiResult<Subject> {
        self.subject_repo
            .find_by_code(subject_code.trim())?
            .ok_or_else(|| ApiError::NotFound(format!("课程({})不存在", subject_code)))
    }

    /// 全部课程（代码升序）
    pub fn list_subjects(&self) -> ApiResult<Vec<Subject>> {
        Ok(self.subject_repo.list_all()?)
    }

    pub fn delete_subject(&self, subject_code: &str) -> ApiResult<()> {
        if !self.subject_repo.delete_by_code(subject_code.trim())? {
            return Err(ApiError::NotFound(format!("课程({})不存在", subject_code)));
        }
        Ok(())
    }
}
