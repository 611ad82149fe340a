// ==========================================
// 班级课表排课系统 - 学期领域模型
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 未配置当前学期时使用的默认值
pub const DEFAULT_CURRENT_TERM: &str = "2/2568";

/// 首次启动时预置的学期
pub const SEED_TERMS: [&str; 2] = ["1/2568", "2/2568"];

// ==========================================
// Term - 学期
// ==========================================
// 学期名称为不透明标签 (如 "2/2568"), 同时作为主键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub term_name: String,
    pub created_at: NaiveDateTime,
}
