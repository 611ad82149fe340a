// ==========================================
// 班级课表排课系统 - 课程领域模型
// ==========================================
// 用途: 课程时长 = 理论学时 + 实践学时
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Subject - 课程
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub subject_code: String,    // 课程代码 (主键)
    pub name_th: Option<String>, // 课程名称 (泰文)
    pub theory_hrs: i32,         // 理论学时
    pub practice_hrs: i32,       // 实践学时
    pub credits: i32,            // 学分 (仅描述用)
}

impl Subject {
    pub fn new(subject_code: &str, theory_hrs: i32, practice_hrs: i32) -> Self {
        Self {
            subject_code: subject_code.trim().to_string(),
            name_th: None,
            theory_hrs,
            practice_hrs,
            credits: 0,
        }
    }

    /// 排课时长（占用的时段数）
    ///
    /// 结果可能 <= 0（数据质量问题），由分配引擎负责拒绝;
    /// 超出 i32 范围时饱和, 由网格校验拒绝
    pub fn duration(&self) -> i32 {
        self.theory_hrs.saturating_add(self.practice_hrs)
    }
}
