// ==========================================
// 班级课表排课系统 - 课表视图模型
// ==========================================
// 职责: 将条目列表展开为 星期 × 时段 网格, 供班级/教师/教室视图渲染
// 红线: 只读模型, 不参与冲突判定
// ==========================================

use crate::domain::schedule_entry::ScheduleEntry;
use crate::domain::slot::{FIRST_SLOT, LAST_SLOT};
use crate::domain::types::Day;
use serde::{Deserialize, Serialize};

// ==========================================
// TimetableOwner - 课表归属
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimetableOwner {
    Group(String),
    Teacher(String),
    Room(String),
}

impl TimetableOwner {
    pub fn id(&self) -> &str {
        match self {
            TimetableOwner::Group(id) | TimetableOwner::Teacher(id) | TimetableOwner::Room(id) => id,
        }
    }
}

// ==========================================
// TimetableCell - 单个时段格
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimetableCell {
    /// 空闲
    Free,
    /// 条目的第一个时段, span = 占用时段数
    Start { entry: ScheduleEntry, span: i32 },
    /// 条目的后续时段
    Covered { entry_id: String },
}

impl TimetableCell {
    pub fn is_free(&self) -> bool {
        matches!(self, TimetableCell::Free)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRow {
    pub day: Day,
    pub cells: Vec<TimetableCell>, // 下标 0 对应第 1 节
}

impl DayRow {
    fn empty(day: Day) -> Self {
        Self {
            day,
            cells: vec![TimetableCell::Free; (LAST_SLOT - FIRST_SLOT + 1) as usize],
        }
    }

    /// 查询某节的格子
    pub fn cell(&self, slot: i32) -> Option<&TimetableCell> {
        if slot < FIRST_SLOT {
            return None;
        }
        self.cells.get((slot - FIRST_SLOT) as usize)
    }
}

// ==========================================
// Timetable - 周课表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub owner: TimetableOwner,
    pub term: String,
    pub days: Vec<DayRow>,
}

impl Timetable {
    /// 由条目构建周课表
    ///
    /// # 规则
    /// - 其他学期的条目忽略
    /// - 网格外的时段截断
    /// - 同一格已被占用时保留先开始的条目
    pub fn build(owner: TimetableOwner, term: &str, entries: &[ScheduleEntry]) -> Self {
        let mut days: Vec<DayRow> = Day::ALL.iter().map(|d| DayRow::empty(*d)).collect();

        let mut in_term: Vec<&ScheduleEntry> = entries.iter().filter(|e| e.term == term).collect();
        in_term.sort_by_key(|e| (e.day, e.start_slot));

        for entry in in_term {
            let Some(row) = days.iter_mut().find(|r| r.day == entry.day) else {
                continue;
            };
            let start = entry.start_slot.max(FIRST_SLOT);
            let end = entry.end_slot.min(LAST_SLOT + 1);
            if start >= end {
                continue;
            }

            let first = (start - FIRST_SLOT) as usize;
            if !row.cells[first].is_free() {
                tracing::warn!(entry_id = %entry.entry_id, day = %entry.day, slot = start, "课表格子重复占用, 已忽略");
                continue;
            }

            row.cells[first] = TimetableCell::Start {
                entry: entry.clone(),
                span: end - start,
            };
            for slot in (start + 1)..end {
                let idx = (slot - FIRST_SLOT) as usize;
                if row.cells[idx].is_free() {
                    row.cells[idx] = TimetableCell::Covered {
                        entry_id: entry.entry_id.clone(),
                    };
                }
            }
        }

        Self {
            owner,
            term: term.to_string(),
            days,
        }
    }

    /// 课表中的条目数
    pub fn entry_count(&self) -> usize {
        self.days
            .iter()
            .flat_map(|r| r.cells.iter())
            .filter(|c| matches!(c, TimetableCell::Start { .. }))
            .count()
    }

    /// 某天被占用的节次（升序）
    pub fn occupied_slots(&self, day: Day) -> Vec<i32> {
        self.row(day)
            .map(|row| {
                row.cells
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.is_free())
                    .map(|(i, _)| i as i32 + FIRST_SLOT)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn row(&self, day: Day) -> Option<&DayRow> {
        self.days.iter().find(|r| r.day == day)
    }
}
