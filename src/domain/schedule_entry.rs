// ==========================================
// 班级课表排课系统 - 排课条目领域模型
// ==========================================
// 红线: 条目只能由分配引擎在校验通过后创建
// 红线: 不原地修改, 变更 = 删除后重建
// ==========================================

use crate::domain::slot::SlotRange;
use crate::domain::types::{Day, ResourceAxis};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ScheduleEntry - 排课条目
// ==========================================
// 不变式: 1 <= start_slot < end_slot <= 14, 且不跨午休边界
// 休息课: teacher_id / room_id / subject_code 均为 None
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub entry_id: String,             // 条目ID (UUID)
    pub day: Day,                     // 星期
    pub start_slot: i32,              // 起始时段（含）
    pub end_slot: i32,                // 结束时段（不含）
    pub term: String,                 // 学期
    pub group_id: String,             // 班级
    pub teacher_id: Option<String>,   // 教师
    pub room_id: Option<String>,      // 教室
    pub subject_code: Option<String>, // 课程代码
    pub created_at: NaiveDateTime,    // 创建时间
}

impl ScheduleEntry {
    pub fn slot_range(&self) -> SlotRange {
        SlotRange::new(self.start_slot, self.end_slot)
    }

    /// 是否为休息课条目
    pub fn is_break(&self) -> bool {
        self.subject_code.is_none()
    }

    /// 计算与给定资源共享的维度
    ///
    /// 教师/教室维度仅在双方都非空且相等时计入; 班级维度总是比较
    ///
    /// # 返回
    /// 按 教师 → 教室 → 班级 固定顺序排列的共享维度
    pub fn shared_axes(
        &self,
        teacher_id: Option<&str>,
        room_id: Option<&str>,
        group_id: &str,
    ) -> Vec<ResourceAxis> {
        let mut axes = Vec::new();

        if let (Some(mine), Some(theirs)) = (self.teacher_id.as_deref(), teacher_id) {
            if mine == theirs {
                axes.push(ResourceAxis::Teacher);
            }
        }
        if let (Some(mine), Some(theirs)) = (self.room_id.as_deref(), room_id) {
            if mine == theirs {
                axes.push(ResourceAxis::Room);
            }
        }
        if self.group_id == group_id {
            axes.push(ResourceAxis::Group);
        }

        axes
    }
}

// ==========================================
// AllocationRequest - 排课请求
// ==========================================
// 由人工操作员提交的单个排课提议; 学期必须显式给出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub day: Day,
    pub start_slot: i32,
    pub term: String,
    pub group_id: String,
    pub subject_code: String, // 课程代码或 BREAK
    pub teacher_id: Option<String>,
    pub room_id: Option<String>,
}
