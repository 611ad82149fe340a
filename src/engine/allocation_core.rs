// ==========================================
// 班级课表排课系统 - Allocation Core 纯函数库
// ==========================================
// 职责: 时长解析、网格/午休校验、资源重叠扫描、条目构造
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::slot::{self, SlotRange, BREAK_DURATION};
use crate::domain::{AllocationRequest, ScheduleEntry, Subject};
use crate::engine::reject::RejectReason;
use chrono::Utc;
use uuid::Uuid;

// ==========================================
// ResolvedAllocation - 解析后的排课内容
// ==========================================
// 休息课: 教师/教室/课程强制为空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAllocation {
    pub duration: i32,
    pub subject_code: Option<String>,
    pub teacher_id: Option<String>,
    pub room_id: Option<String>,
}

// ==========================================
// AllocationCore - 纯函数工具类
// ==========================================
pub struct AllocationCore;

impl AllocationCore {
    /// 休息课的解析结果（时长固定为 1, 无任何资源）
    pub fn resolve_break() -> ResolvedAllocation {
        ResolvedAllocation {
            duration: BREAK_DURATION,
            subject_code: None,
            teacher_id: None,
            room_id: None,
        }
    }

    /// 由课程解析排课内容
    ///
    /// # 规则
    /// - 课程不存在 → UnknownSubject
    /// - theory_hrs + practice_hrs <= 0 → InvalidDuration
    pub fn resolve_subject(
        request: &AllocationRequest,
        subject: Option<Subject>,
    ) -> Result<ResolvedAllocation, RejectReason> {
        let subject = subject.ok_or_else(|| RejectReason::UnknownSubject {
            subject_code: request.subject_code.clone(),
        })?;

        let duration = subject.duration();
        if duration <= 0 {
            return Err(RejectReason::InvalidDuration {
                subject_code: subject.subject_code,
                duration,
            });
        }

        Ok(ResolvedAllocation {
            duration,
            subject_code: Some(subject.subject_code),
            teacher_id: request.teacher_id.clone(),
            room_id: request.room_id.clone(),
        })
    }

    /// 校验区间: 先网格边界, 后午休边界
    pub fn validate_range(range: SlotRange) -> Result<(), RejectReason> {
        if !slot::within_grid(range.start, range.end) {
            return Err(RejectReason::OutOfGridBounds {
                start_slot: range.start,
                end_slot: range.end,
            });
        }

        if slot::crosses_lunch(range.start, range.end) {
            return Err(RejectReason::CrossesLunchBreak {
                start_slot: range.start,
                end_slot: range.end,
            });
        }

        Ok(())
    }

    /// 扫描已有条目, 返回第一个冲突
    ///
    /// # 规则
    /// - 仅比较同学期、同一天的条目 (调用方未预过滤时在此过滤)
    /// - 区间重叠 且 共享至少一个非空资源维度 → ResourceConflict
    /// - 班级维度总是比较, 因此休息课也会与本班条目冲突
    ///
    /// # 说明
    /// 线性扫描; 每日最多 13 个时段, 无需区间索引
    pub fn find_conflict(
        request: &AllocationRequest,
        resolved: &ResolvedAllocation,
        range: SlotRange,
        existing: &[ScheduleEntry],
    ) -> Option<RejectReason> {
        existing
            .iter()
            .filter(|e| e.day == request.day && e.term == request.term)
            .filter(|e| e.slot_range().overlaps(&range))
            .find_map(|e| {
                let axes = e.shared_axes(
                    resolved.teacher_id.as_deref(),
                    resolved.room_id.as_deref(),
                    &request.group_id,
                );
                if axes.is_empty() {
                    return None;
                }
                Some(RejectReason::ResourceConflict {
                    term: request.term.clone(),
                    day: request.day,
                    axes,
                    existing_entry_id: e.entry_id.clone(),
                    existing_start: e.start_slot,
                    existing_end: e.end_slot,
                })
            })
    }

    /// 构造新条目（新 UUID, 当前时间）
    pub fn build_entry(
        request: &AllocationRequest,
        resolved: ResolvedAllocation,
        range: SlotRange,
    ) -> ScheduleEntry {
        ScheduleEntry {
            entry_id: Uuid::new_v4().to_string(),
            day: request.day,
            start_slot: range.start,
            end_slot: range.end,
            term: request.term.clone(),
            group_id: request.group_id.clone(),
            teacher_id: resolved.teacher_id,
            room_id: resolved.room_id,
            subject_code: resolved.subject_code,
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Day, ResourceAxis};

    fn make_request(start: i32, group: &str) -> AllocationRequest {
        AllocationRequest {
            day: Day::Monday,
            start_slot: start,
            term: "T1".to_string(),
            group_id: group.to_string(),
            subject_code: "S1".to_string(),
            teacher_id: Some("X".to_string()),
            room_id: Some("Y".to_string()),
        }
    }

    fn make_existing(id: &str, start: i32, end: i32, group: &str) -> ScheduleEntry {
        ScheduleEntry {
            entry_id: id.to_string(),
            day: Day::Monday,
            start_slot: start,
            end_slot: end,
            term: "T1".to_string(),
            group_id: group.to_string(),
            teacher_id: None,
            room_id: None,
            subject_code: Some("S0".to_string()),
            created_at: Utc::now().naive_utc(),
        }
    }

    // ==========================================
    // 时长解析
    // ==========================================

    #[test]
    fn test_resolve_subject_missing() {
        let request = make_request(1, "G1");
        let result = AllocationCore::resolve_subject(&request, None);
        assert_eq!(
            result,
            Err(RejectReason::UnknownSubject {
                subject_code: "S1".to_string()
            })
        );
    }

    #[test]
    fn test_resolve_subject_zero_duration() {
        let request = make_request(1, "G1");
        let result = AllocationCore::resolve_subject(&request, Some(Subject::new("S1", 0, 0)));
        assert_eq!(
            result,
            Err(RejectReason::InvalidDuration {
                subject_code: "S1".to_string(),
                duration: 0
            })
        );
    }

    #[test]
    fn test_resolve_subject_keeps_resources() {
        let request = make_request(1, "G1");
        let resolved =
            AllocationCore::resolve_subject(&request, Some(Subject::new("S1", 2, 1))).unwrap();
        assert_eq!(resolved.duration, 3);
        assert_eq!(resolved.teacher_id.as_deref(), Some("X"));
        assert_eq!(resolved.room_id.as_deref(), Some("Y"));
        assert_eq!(resolved.subject_code.as_deref(), Some("S1"));
    }

    #[test]
    fn test_resolve_break_has_no_resources() {
        let resolved = AllocationCore::resolve_break();
        assert_eq!(resolved.duration, 1);
        assert!(resolved.teacher_id.is_none());
        assert!(resolved.room_id.is_none());
        assert!(resolved.subject_code.is_none());
    }

    // ==========================================
    // 区间校验
    // ==========================================

    #[test]
    fn test_validate_range_order_grid_before_lunch() {
        // 同时越界且跨午休时, 报越界
        assert_eq!(
            AllocationCore::validate_range(SlotRange::new(0, 7)),
            Err(RejectReason::OutOfGridBounds {
                start_slot: 0,
                end_slot: 7
            })
        );
        assert_eq!(
            AllocationCore::validate_range(SlotRange::new(4, 7)),
            Err(RejectReason::CrossesLunchBreak {
                start_slot: 4,
                end_slot: 7
            })
        );
        assert!(AllocationCore::validate_range(SlotRange::new(13, 14)).is_ok());
    }

    // ==========================================
    // 冲突扫描
    // ==========================================

    #[test]
    fn test_find_conflict_group_axis() {
        let request = make_request(2, "G1");
        let resolved = AllocationCore::resolve_break();
        let existing = vec![make_existing("E1", 1, 4, "G1")];

        let conflict =
            AllocationCore::find_conflict(&request, &resolved, SlotRange::new(2, 3), &existing)
                .unwrap();
        assert_eq!(conflict.conflicting_axes(), &[ResourceAxis::Group]);
    }

    #[test]
    fn test_find_conflict_ignores_other_term_and_day() {
        let request = make_request(1, "G1");
        let resolved = AllocationCore::resolve_break();
        let mut other_term = make_existing("E1", 1, 4, "G1");
        other_term.term = "T2".to_string();
        let mut other_day = make_existing("E2", 1, 4, "G1");
        other_day.day = Day::Tuesday;

        assert!(AllocationCore::find_conflict(
            &request,
            &resolved,
            SlotRange::new(1, 2),
            &[other_term, other_day]
        )
        .is_none());
    }

    #[test]
    fn test_find_conflict_teacher_axis_only_when_both_set() {
        let request = make_request(1, "G2");
        let resolved =
            AllocationCore::resolve_subject(&request, Some(Subject::new("S1", 1, 0))).unwrap();

        let mut busy_teacher = make_existing("E1", 1, 2, "G1");
        busy_teacher.teacher_id = Some("X".to_string());
        let conflict = AllocationCore::find_conflict(
            &request,
            &resolved,
            SlotRange::new(1, 2),
            &[busy_teacher],
        )
        .unwrap();
        assert_eq!(conflict.conflicting_axes(), &[ResourceAxis::Teacher]);

        // 已有条目无教师 → 不冲突
        let free = make_existing("E2", 1, 2, "G1");
        assert!(
            AllocationCore::find_conflict(&request, &resolved, SlotRange::new(1, 2), &[free])
                .is_none()
        );
    }

    #[test]
    fn test_build_entry_uses_range_and_resources() {
        let request = make_request(6, "G1");
        let resolved =
            AllocationCore::resolve_subject(&request, Some(Subject::new("S1", 2, 0))).unwrap();
        let entry = AllocationCore::build_entry(&request, resolved, SlotRange::new(6, 8));

        assert_eq!(entry.start_slot, 6);
        assert_eq!(entry.end_slot, 8);
        assert_eq!(entry.group_id, "G1");
        assert_eq!(entry.subject_code.as_deref(), Some("S1"));
        assert!(Uuid::parse_str(&entry.entry_id).is_ok());
    }
}
