// ==========================================
// 班级课表排课系统 - 引擎外部协作者接口
// ==========================================
// 职责: 定义分配引擎消费的两个外部协作者
// - SubjectLookup: 课程代码 → 学时
// - EntryStore: 排课条目的读取/持久化/删除
// 红线: 引擎只通过这两个接口访问数据, 自身不做 I/O
// ==========================================

use crate::domain::{Day, ScheduleEntry, Subject};
use crate::repository::error::RepositoryResult;
use std::collections::HashMap;

// ==========================================
// Trait: SubjectLookup
// ==========================================
pub trait SubjectLookup: Send + Sync {
    /// 按课程代码查询课程
    ///
    /// # 返回
    /// - Ok(Some(Subject)): 找到课程
    /// - Ok(None): 课程不存在
    /// - Err: 存储层故障（原样上抛, 不重试）
    fn find_subject(&self, subject_code: &str) -> RepositoryResult<Option<Subject>>;
}

// 内存实现: 便于纯计算场景与测试直接使用
impl SubjectLookup for HashMap<String, Subject> {
    fn find_subject(&self, subject_code: &str) -> RepositoryResult<Option<Subject>> {
        Ok(self.get(subject_code).cloned())
    }
}

// ==========================================
// Trait: EntryStore
// ==========================================
pub trait EntryStore: Send + Sync {
    /// 查询同一学期、同一天的全部条目
    fn find_by_day_and_term(&self, day: Day, term: &str) -> RepositoryResult<Vec<ScheduleEntry>>;

    /// 持久化已通过校验的条目
    ///
    /// 实现方可在写入时再次做重叠检查, 发现竞争时返回
    /// `RepositoryError::ConcurrentConflict`
    fn insert(&self, entry: &ScheduleEntry) -> RepositoryResult<String>;

    /// 按条目ID删除
    ///
    /// # 返回
    /// - Ok(true): 删除了一条记录
    /// - Ok(false): 条目不存在
    fn delete_by_id(&self, entry_id: &str) -> RepositoryResult<bool>;

    /// 删除某班级在某学期的全部条目
    ///
    /// # 返回
    /// - Ok(usize): 删除的条目数
    fn delete_by_group_and_term(&self, group_id: &str, term: &str) -> RepositoryResult<usize>;
}
