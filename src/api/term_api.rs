// ==========================================
// 班级课表排课系统 - 学期 API
// ==========================================
// 职责: 学期登记与当前学期管理
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::Term;
use crate::repository::TermRepository;

pub struct TermApi {
    term_repo: Arc<TermRepository>,
    config_manager: Arc<ConfigManager>,
}

impl TermApi {
    pub fn new(term_repo: Arc<TermRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            term_repo,
            config_manager,
        }
    }

    /// 当前学期（每次从持久化配置读取）
    pub fn current_term(&self) -> ApiResult<String> {
        Ok(self.config_manager.get_current_term()?)
    }

    /// 设置当前学期
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 学期未登记
    pub fn set_current_term(&self, term: &str) -> ApiResult<()> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidInput("学期不能为空".to_string()));
        }
        if !self.term_repo.exists(trimmed)? {
            return Err(ApiError::NotFound(format!("学期({})未登记", trimmed)));
        }

        self.config_manager.set_current_term(trimmed)?;
        tracing::info!(term = trimmed, "当前学期已切换");
        Ok(())
    }

    /// 登记学期（已存在时不报错）
    ///
    /// # 返回
    /// - Ok(true): 新建
    /// - Ok(false): 已存在
    pub fn add_term(&self, term: &str) -> ApiResult<bool> {
        let created = self.term_repo.find_or_create(term)?;
        if created {
            tracing::info!(term = term.trim(), "学期已登记");
        }
        Ok(created)
    }

    /// 全部学期（名称降序）
    pub fn list_terms(&self) -> ApiResult<Vec<Term>> {
        Ok(self.term_repo.list_all()?)
    }
}
