// ==========================================
// 班级课表排课系统 - 时段模型
// ==========================================
// 职责: 定义每日离散时段网格、午休边界、休息课标记
// 红线: 纯函数, 无副作用, 不依赖任何其他模块
// ==========================================
// 区间语义: [start, end) 左闭右开, end 为最后占用时段的下一个时段
// ==========================================

use serde::{Deserialize, Serialize};

/// 每日第一个时段
pub const FIRST_SLOT: i32 = 1;

/// 每日最后一个时段
pub const LAST_SLOT: i32 = 13;

/// 区间结束位置上限（开区间, = LAST_SLOT + 1）
pub const GRID_END: i32 = LAST_SLOT + 1;

/// 午休前最后一个时段; 任何条目不得跨越该边界
pub const LUNCH_BOUNDARY_SLOT: i32 = 5;

/// 休息课的保留课程代码
pub const BREAK_SUBJECT_CODE: &str = "BREAK";

/// 休息课固定时长
pub const BREAK_DURATION: i32 = 1;

/// 判断两个左闭右开区间是否重叠
///
/// 相邻区间（a_end == b_start）不算重叠
pub fn slots_overlap(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
    a_start < b_end && b_start < a_end
}

/// 判断区间是否落在每日网格内: 1 <= start < end <= 14
pub fn within_grid(start: i32, end: i32) -> bool {
    FIRST_SLOT <= start && start < end && end <= GRID_END
}

/// 判断区间是否跨越午休边界
pub fn crosses_lunch(start: i32, end: i32) -> bool {
    start < LUNCH_BOUNDARY_SLOT && end > LUNCH_BOUNDARY_SLOT
}

/// 判断课程代码是否为休息课
pub fn is_break_code(subject_code: &str) -> bool {
    subject_code.trim().eq_ignore_ascii_case(BREAK_SUBJECT_CODE)
}

// ==========================================
// SlotRange - 时段区间
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: i32, // 起始时段（含）
    pub end: i32,   // 结束时段（不含）
}

impl SlotRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// 由起始时段与时长构造
    ///
    /// 溢出时 end 饱和到 i32 边界, 结果必然不在网格内
    pub fn from_duration(start: i32, duration: i32) -> Self {
        Self {
            start,
            end: start.saturating_add(duration),
        }
    }

    pub fn len(&self) -> i32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &SlotRange) -> bool {
        slots_overlap(self.start, self.end, other.start, other.end)
    }

    pub fn contains_slot(&self, slot: i32) -> bool {
        self.start <= slot && slot < self.end
    }

    pub fn is_within_grid(&self) -> bool {
        within_grid(self.start, self.end)
    }

    pub fn crosses_lunch(&self) -> bool {
        crosses_lunch(self.start, self.end)
    }
}
