// ==========================================
// 班级课表排课系统 - 引擎层
// ==========================================
// 职责: 实现排课规则 (网格/午休/资源冲突), 不拼 SQL
// 红线: Engine 不拼 SQL, 所有拒绝必须输出原因
// ==========================================

pub mod allocation;
pub mod allocation_core;
pub mod collaborators;
pub mod reject;
pub mod slot_lock;

// 重导出核心引擎
pub use allocation::AllocationEngine;
pub use allocation_core::{AllocationCore, ResolvedAllocation};
pub use collaborators::{EntryStore, SubjectLookup};
pub use reject::{AllocationError, AllocationResult, RejectReason};
pub use slot_lock::SlotLockRegistry;
