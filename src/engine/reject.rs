// ==========================================
// 班级课表排课系统 - 排课拒绝原因
// ==========================================
// 红线: 所有拒绝都是终态, 不自动重试, 拒绝时不写任何数据
// 红线: 拒绝原因必须携带足够细节 (星期/学期/维度) 供调用方展示
// ==========================================

use crate::domain::{Day, ResourceAxis};
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 排课拒绝原因
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// 课程代码不存在
    #[error("课程不存在: {subject_code}")]
    UnknownSubject { subject_code: String },

    /// 课程学时合计 <= 0 (数据质量问题)
    #[error("课程学时无效: subject={subject_code}, duration={duration}")]
    InvalidDuration { subject_code: String, duration: i32 },

    /// 区间超出每日网格
    #[error("超出每日时段网格: start={start_slot}, end={end_slot} (要求 1 <= start < end <= 14)")]
    OutOfGridBounds { start_slot: i32, end_slot: i32 },

    /// 区间跨越午休边界
    #[error("不能跨越午休时段: start={start_slot}, end={end_slot}")]
    CrossesLunchBreak { start_slot: i32, end_slot: i32 },

    /// 与已有条目在至少一个资源维度上时段重叠
    #[error(
        "资源时段冲突: term={term}, day={day}, 维度={}, 已有条目={existing_entry_id} [{existing_start}, {existing_end})",
        format_axes(.axes)
    )]
    ResourceConflict {
        term: String,
        day: Day,
        axes: Vec<ResourceAxis>,
        existing_entry_id: String,
        existing_start: i32,
        existing_end: i32,
    },

    /// 写入时由存储层检测到的并发竞争
    #[error("并发排课冲突: term={term}, day={day}, 已有条目={existing_entry_id}")]
    ConcurrentConflict {
        term: String,
        day: Day,
        existing_entry_id: String,
    },
}

fn format_axes(axes: &[ResourceAxis]) -> String {
    axes.iter()
        .map(|axis| axis.to_string())
        .collect::<Vec<_>>()
        .join("+")
}

impl RejectReason {
    /// 冲突维度（仅 ResourceConflict 非空）
    pub fn conflicting_axes(&self) -> &[ResourceAxis] {
        match self {
            RejectReason::ResourceConflict { axes, .. } => axes,
            _ => &[],
        }
    }
}

// ==========================================
// AllocationError - 分配引擎错误
// ==========================================
// 拒绝 (业务结果) 与协作者故障 (原样上抛) 分开表达
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error(transparent)]
    Rejected(#[from] RejectReason),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AllocationError {
    /// 若为拒绝则返回拒绝原因
    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            AllocationError::Rejected(reason) => Some(reason),
            AllocationError::Repository(_) => None,
        }
    }
}

pub type AllocationResult<T> = Result<T, AllocationError>;
