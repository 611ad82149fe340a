// ==========================================
// 班级课表排课系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、时段网格规则
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod role;
pub mod schedule_entry;
pub mod slot;
pub mod subject;
pub mod term;
pub mod timetable;
pub mod types;

// 重导出核心类型
pub use role::{Operation, Role};
pub use schedule_entry::{AllocationRequest, ScheduleEntry};
pub use slot::SlotRange;
pub use subject::Subject;
pub use term::Term;
pub use timetable::{DayRow, Timetable, TimetableCell, TimetableOwner};
pub use types::{Day, ResourceAxis};
