// ==========================================
// 班级课表排课系统 - 分配引擎
// ==========================================
// 红线: 拒绝时不写任何数据; 拒绝为终态, 不自动重试
// 红线: 同一 (学期, 星期) 的 "读取 → 校验 → 写入" 必须串行
// ==========================================
// 职责: 排课提议校验 + 写入编排 + 删除/清空
// 输入: AllocationRequest + SubjectLookup + EntryStore
// 输出: 新建的 ScheduleEntry 或 RejectReason
// ==========================================

use crate::domain::slot::{is_break_code, SlotRange};
use crate::domain::{AllocationRequest, ScheduleEntry};
use crate::engine::allocation_core::AllocationCore;
use crate::engine::collaborators::{EntryStore, SubjectLookup};
use crate::engine::reject::{AllocationError, AllocationResult, RejectReason};
use crate::engine::slot_lock::SlotLockRegistry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use tracing::instrument;

// ==========================================
// AllocationEngine - 分配引擎
// ==========================================
// 除时段锁外无状态; 同一进程内所有调用方应共享同一实例
#[derive(Debug, Default)]
pub struct AllocationEngine {
    slot_locks: SlotLockRegistry,
}

impl AllocationEngine {
    /// 创建新的 AllocationEngine 实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 校验排课提议（纯校验, 不写库）
    ///
    /// # 参数
    /// - request: 排课请求
    /// - subjects: 课程查询
    /// - existing: 已有条目 (可未按学期/星期预过滤)
    ///
    /// # 返回
    /// - Ok(ScheduleEntry): 通过校验的新条目, 由调用方持久化
    /// - Err(Rejected): 拒绝原因
    /// - Err(Repository): 课程查询故障, 原样上抛
    #[instrument(
        skip(self, request, subjects, existing),
        fields(term = %request.term, day = %request.day, group = %request.group_id, start = request.start_slot)
    )]
    pub fn propose_allocation<S>(
        &self,
        request: &AllocationRequest,
        subjects: &S,
        existing: &[ScheduleEntry],
    ) -> AllocationResult<ScheduleEntry>
    where
        S: SubjectLookup + ?Sized,
    {
        // === 步骤 1: 解析时长与资源 ===
        let resolved = if is_break_code(&request.subject_code) {
            AllocationCore::resolve_break()
        } else {
            let subject = subjects.find_subject(request.subject_code.trim()).map_err(|e| {
                tracing::warn!(error = %e, subject_code = %request.subject_code, "课程查询失败");
                e
            })?;
            AllocationCore::resolve_subject(request, subject).map_err(Self::log_reject)?
        };

        // === 步骤 2: 网格与午休校验 ===
        let range = SlotRange::from_duration(request.start_slot, resolved.duration);
        AllocationCore::validate_range(range).map_err(Self::log_reject)?;

        // === 步骤 3: 资源冲突扫描 ===
        if let Some(reason) = AllocationCore::find_conflict(request, &resolved, range, existing) {
            return Err(Self::log_reject(reason).into());
        }

        // === 步骤 4: 构造条目 ===
        Ok(AllocationCore::build_entry(request, resolved, range))
    }

    /// 校验并写入排课条目
    ///
    /// # 并发控制
    /// 持有 (学期, 星期) 锁完成 读取 → 校验 → 写入;
    /// 存储层写入时检测到竞争则转换为 ConcurrentConflict 拒绝
    #[instrument(
        skip(self, request, subjects, store),
        fields(term = %request.term, day = %request.day, group = %request.group_id)
    )]
    pub fn allocate<S, E>(
        &self,
        request: &AllocationRequest,
        subjects: &S,
        store: &E,
    ) -> AllocationResult<ScheduleEntry>
    where
        S: SubjectLookup + ?Sized,
        E: EntryStore + ?Sized,
    {
        self.slot_locks.with_lock(&request.term, request.day, || -> AllocationResult<ScheduleEntry> {
            let existing = store.find_by_day_and_term(request.day, &request.term)?;
            let entry = self.propose_allocation(request, subjects, &existing)?;

            match store.insert(&entry) {
                Ok(entry_id) => {
                    tracing::info!(
                        entry_id = %entry_id,
                        start = entry.start_slot,
                        end = entry.end_slot,
                        subject = ?entry.subject_code,
                        "排课成功"
                    );
                    Ok(entry)
                }
                Err(RepositoryError::ConcurrentConflict {
                    existing_entry_id, ..
                }) => {
                    let reason = RejectReason::ConcurrentConflict {
                        term: request.term.clone(),
                        day: request.day,
                        existing_entry_id,
                    };
                    Err(Self::log_reject(reason).into())
                }
                Err(e) => {
                    tracing::error!(error = %e, "排课条目写入失败");
                    Err(AllocationError::Repository(e))
                }
            }
        })
    }

    /// 按ID删除条目（不做冲突复查）
    ///
    /// # 返回
    /// - Ok(true): 删除成功
    /// - Ok(false): 条目不存在
    #[instrument(skip(self, store))]
    pub fn remove_allocation<E>(&self, store: &E, entry_id: &str) -> RepositoryResult<bool>
    where
        E: EntryStore + ?Sized,
    {
        let removed = store.delete_by_id(entry_id)?;
        if removed {
            tracing::info!("排课条目已删除");
        } else {
            tracing::info!("排课条目不存在, 无需删除");
        }
        Ok(removed)
    }

    /// 清空班级在某学期的全部条目
    #[instrument(skip(self, store))]
    pub fn clear_allocations<E>(&self, store: &E, group_id: &str, term: &str) -> RepositoryResult<usize>
    where
        E: EntryStore + ?Sized,
    {
        let removed = store.delete_by_group_and_term(group_id, term)?;
        tracing::info!(removed, "班级学期课表已清空");
        Ok(removed)
    }

    fn log_reject(reason: RejectReason) -> RejectReason {
        tracing::info!(reason = %reason, "排课提议被拒绝");
        reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Day, ResourceAxis, Subject};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // 内存 EntryStore, 不做写入复查
    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<Vec<ScheduleEntry>>,
    }

    impl EntryStore for MemoryStore {
        fn find_by_day_and_term(&self, day: Day, term: &str) -> RepositoryResult<Vec<ScheduleEntry>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.day == day && e.term == term)
                .cloned()
                .collect())
        }

        fn insert(&self, entry: &ScheduleEntry) -> RepositoryResult<String> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry.entry_id.clone())
        }

        fn delete_by_id(&self, entry_id: &str) -> RepositoryResult<bool> {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|e| e.entry_id != entry_id);
            Ok(entries.len() < before)
        }

        fn delete_by_group_and_term(&self, group_id: &str, term: &str) -> RepositoryResult<usize> {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|e| !(e.group_id == group_id && e.term == term));
            Ok(before - entries.len())
        }
    }

    // 写入时总报告竞争的 EntryStore
    struct RacingStore;

    impl EntryStore for RacingStore {
        fn find_by_day_and_term(&self, _: Day, _: &str) -> RepositoryResult<Vec<ScheduleEntry>> {
            Ok(vec![])
        }

        fn insert(&self, entry: &ScheduleEntry) -> RepositoryResult<String> {
            Err(RepositoryError::ConcurrentConflict {
                term: entry.term.clone(),
                day: entry.day.to_db_str().to_string(),
                existing_entry_id: "OTHER".to_string(),
            })
        }

        fn delete_by_id(&self, _: &str) -> RepositoryResult<bool> {
            Ok(false)
        }

        fn delete_by_group_and_term(&self, _: &str, _: &str) -> RepositoryResult<usize> {
            Ok(0)
        }
    }

    struct FailingLookup;

    impl SubjectLookup for FailingLookup {
        fn find_subject(&self, _: &str) -> RepositoryResult<Option<Subject>> {
            Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()))
        }
    }

    fn subjects() -> HashMap<String, Subject> {
        let mut map = HashMap::new();
        map.insert("S1".to_string(), Subject::new("S1", 2, 1));
        map.insert("S2".to_string(), Subject::new("S2", 2, 0));
        map.insert("S5".to_string(), Subject::new("S5", 3, 2));
        map.insert("ZERO".to_string(), Subject::new("ZERO", 0, 0));
        map.insert("BIG".to_string(), Subject::new("BIG", i32::MAX, 1));
        map
    }

    fn request(day: Day, start: i32, group: &str, subject: &str) -> AllocationRequest {
        AllocationRequest {
            day,
            start_slot: start,
            term: "T1".to_string(),
            group_id: group.to_string(),
            subject_code: subject.to_string(),
            teacher_id: None,
            room_id: None,
        }
    }

    fn existing_entry(start: i32, end: i32, group: &str, teacher: Option<&str>) -> ScheduleEntry {
        ScheduleEntry {
            entry_id: "E1".to_string(),
            day: Day::Monday,
            start_slot: start,
            end_slot: end,
            term: "T1".to_string(),
            group_id: group.to_string(),
            teacher_id: teacher.map(str::to_string),
            room_id: None,
            subject_code: Some("S1".to_string()),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn reject_of(result: AllocationResult<ScheduleEntry>) -> RejectReason {
        match result {
            Err(AllocationError::Rejected(reason)) => reason,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    // ==========================================
    // 场景测试
    // ==========================================

    #[test]
    fn test_group_conflict_rejected() {
        let engine = AllocationEngine::new();
        let existing = vec![existing_entry(1, 4, "G1", Some("X"))];
        let mut req = request(Day::Monday, 2, "G1", "S2");
        req.teacher_id = Some("Y".to_string());

        let reason = reject_of(engine.propose_allocation(&req, &subjects(), &existing));
        match reason {
            RejectReason::ResourceConflict {
                axes,
                existing_entry_id,
                existing_start,
                existing_end,
                ..
            } => {
                assert_eq!(axes, vec![ResourceAxis::Group]);
                assert_eq!(existing_entry_id, "E1");
                assert_eq!((existing_start, existing_end), (1, 4));
            }
            other => panic!("unexpected reason {other:?}"),
        }
    }

    #[test]
    fn test_different_group_succeeds() {
        let engine = AllocationEngine::new();
        let existing = vec![existing_entry(1, 4, "G1", Some("X"))];
        let mut req = request(Day::Monday, 2, "G2", "S2");
        req.teacher_id = Some("Y".to_string());

        let entry = engine
            .propose_allocation(&req, &subjects(), &existing)
            .unwrap();
        assert_eq!((entry.start_slot, entry.end_slot), (2, 4));
        assert_eq!(entry.teacher_id.as_deref(), Some("Y"));
    }

    #[test]
    fn test_unused_teacher_and_room_in_other_group_succeeds() {
        let engine = AllocationEngine::new();
        let existing = vec![existing_entry(1, 4, "G1", None)];
        let mut req = request(Day::Monday, 1, "G2", "S1");
        req.teacher_id = Some("X".to_string());
        req.room_id = Some("Y".to_string());

        let entry = engine
            .propose_allocation(&req, &subjects(), &existing)
            .unwrap();
        assert_eq!((entry.start_slot, entry.end_slot), (1, 4));
        assert_eq!(entry.room_id.as_deref(), Some("Y"));
    }

    #[test]
    fn test_lunch_crossing_rejected() {
        let engine = AllocationEngine::new();
        let req = request(Day::Tuesday, 4, "G1", "S1");
        let reason = reject_of(engine.propose_allocation(&req, &subjects(), &[]));
        assert_eq!(
            reason,
            RejectReason::CrossesLunchBreak {
                start_slot: 4,
                end_slot: 7
            }
        );
    }

    #[test]
    fn test_out_of_grid_rejected() {
        let engine = AllocationEngine::new();
        let req = request(Day::Friday, 10, "G1", "S5");
        let reason = reject_of(engine.propose_allocation(&req, &subjects(), &[]));
        assert_eq!(
            reason,
            RejectReason::OutOfGridBounds {
                start_slot: 10,
                end_slot: 15
            }
        );
    }

    #[test]
    fn test_extreme_start_and_hours_rejected_out_of_grid() {
        let engine = AllocationEngine::new();

        let req = request(Day::Monday, i32::MAX, "G1", "S1");
        let reason = reject_of(engine.propose_allocation(&req, &subjects(), &[]));
        assert_eq!(
            reason,
            RejectReason::OutOfGridBounds {
                start_slot: i32::MAX,
                end_slot: i32::MAX
            }
        );

        let req = request(Day::Monday, 1, "G1", "BIG");
        let reason = reject_of(engine.propose_allocation(&req, &subjects(), &[]));
        assert_eq!(
            reason,
            RejectReason::OutOfGridBounds {
                start_slot: 1,
                end_slot: i32::MAX
            }
        );

        // 锁未被污染, 后续请求正常
        let store = MemoryStore::default();
        let req = request(Day::Monday, i32::MAX, "G1", "S1");
        assert!(matches!(
            reject_of(engine.allocate(&req, &subjects(), &store)),
            RejectReason::OutOfGridBounds { .. }
        ));
        assert!(engine
            .allocate(&request(Day::Monday, 1, "G1", "S1"), &subjects(), &store)
            .is_ok());
    }

    #[test]
    fn test_break_at_slot_five() {
        let engine = AllocationEngine::new();
        let mut req = request(Day::Wednesday, 5, "G1", "BREAK");
        req.teacher_id = Some("X".to_string());
        req.room_id = Some("R1".to_string());

        let entry = engine.propose_allocation(&req, &subjects(), &[]).unwrap();
        assert_eq!((entry.start_slot, entry.end_slot), (5, 6));
        assert!(entry.teacher_id.is_none());
        assert!(entry.room_id.is_none());
        assert!(entry.subject_code.is_none());
    }

    #[test]
    fn test_break_collides_on_group() {
        let engine = AllocationEngine::new();
        let existing = vec![existing_entry(1, 4, "G1", None)];
        let req = request(Day::Monday, 3, "G1", "break");
        let reason = reject_of(engine.propose_allocation(&req, &subjects(), &existing));
        assert_eq!(reason.conflicting_axes(), &[ResourceAxis::Group]);
    }

    #[test]
    fn test_unknown_and_zero_duration_subjects() {
        let engine = AllocationEngine::new();
        let reason = reject_of(engine.propose_allocation(
            &request(Day::Monday, 1, "G1", "NOPE"),
            &subjects(),
            &[],
        ));
        assert!(matches!(reason, RejectReason::UnknownSubject { .. }));

        let reason = reject_of(engine.propose_allocation(
            &request(Day::Monday, 1, "G1", "ZERO"),
            &subjects(),
            &[],
        ));
        assert!(matches!(reason, RejectReason::InvalidDuration { duration: 0, .. }));
    }

    #[test]
    fn test_rejection_is_idempotent() {
        let engine = AllocationEngine::new();
        let req = request(Day::Monday, 4, "G1", "S1");
        let first = reject_of(engine.propose_allocation(&req, &subjects(), &[]));
        let second = reject_of(engine.propose_allocation(&req, &subjects(), &[]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_lookup_failure_surfaces_unchanged() {
        let engine = AllocationEngine::new();
        let result = engine.propose_allocation(&request(Day::Monday, 1, "G1", "S1"), &FailingLookup, &[]);
        assert!(matches!(
            result,
            Err(AllocationError::Repository(RepositoryError::DatabaseQueryError(_)))
        ));
    }

    // ==========================================
    // 写入编排
    // ==========================================

    #[test]
    fn test_allocate_then_conflict_then_remove() {
        let engine = AllocationEngine::new();
        let store = MemoryStore::default();
        let req = request(Day::Monday, 1, "G1", "S1");

        let entry = engine.allocate(&req, &subjects(), &store).unwrap();
        let reason = reject_of(engine.allocate(&req, &subjects(), &store));
        assert!(matches!(reason, RejectReason::ResourceConflict { .. }));
        assert_eq!(store.entries.lock().unwrap().len(), 1);

        assert!(engine.remove_allocation(&store, &entry.entry_id).unwrap());
        assert!(!engine.remove_allocation(&store, &entry.entry_id).unwrap());

        // 删除后相同请求再次可行
        assert!(engine.allocate(&req, &subjects(), &store).is_ok());
    }

    #[test]
    fn test_store_race_maps_to_concurrent_conflict() {
        let engine = AllocationEngine::new();
        let req = request(Day::Thursday, 1, "G1", "S1");
        let reason = reject_of(engine.allocate(&req, &subjects(), &RacingStore));
        assert_eq!(
            reason,
            RejectReason::ConcurrentConflict {
                term: "T1".to_string(),
                day: Day::Thursday,
                existing_entry_id: "OTHER".to_string(),
            }
        );
    }

    #[test]
    fn test_clear_allocations_counts() {
        let engine = AllocationEngine::new();
        let store = MemoryStore::default();
        engine
            .allocate(&request(Day::Monday, 1, "G1", "S1"), &subjects(), &store)
            .unwrap();
        engine
            .allocate(&request(Day::Tuesday, 1, "G1", "S1"), &subjects(), &store)
            .unwrap();
        engine
            .allocate(&request(Day::Monday, 1, "G2", "S1"), &subjects(), &store)
            .unwrap();

        assert_eq!(engine.clear_allocations(&store, "G1", "T1").unwrap(), 2);
        assert_eq!(engine.clear_allocations(&store, "G1", "T1").unwrap(), 0);
        assert_eq!(store.entries.lock().unwrap().len(), 1);
    }
}
