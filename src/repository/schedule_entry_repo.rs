// ==========================================
// 班级课表排课系统 - 排课条目数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑 (网格/午休规则由引擎负责)
// 例外: insert 在写事务内复查重叠, 作为并发竞争的最后防线
// ==========================================

use crate::domain::{Day, ScheduleEntry};
use crate::engine::collaborators::EntryStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Arc, Mutex};

const ENTRY_COLUMNS: &str = "entry_id, day, start_slot, end_slot, term, group_id, \
                             teacher_id, room_id, subject_code, created_at";

// 按星期自然顺序排序（文本排序会把 Friday 排在最前）
const DAY_ORDER_SQL: &str = "CASE day \
                             WHEN 'Monday' THEN 1 WHEN 'Tuesday' THEN 2 \
                             WHEN 'Wednesday' THEN 3 WHEN 'Thursday' THEN 4 \
                             WHEN 'Friday' THEN 5 END";

// ==========================================
// ScheduleEntryRepository - 排课条目仓储
// ==========================================

/// 排课条目仓储
/// 职责: 管理 schedule_entry 表的读写
pub struct ScheduleEntryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleEntryRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 打开独立连接创建仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ScheduleEntry> {
        let day_raw: String = row.get(1)?;
        let day = Day::parse(&day_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                Type::Text,
                format!("非法的星期取值: {}", day_raw).into(),
            )
        })?;

        Ok(ScheduleEntry {
            entry_id: row.get(0)?,
            day,
            start_slot: row.get(2)?,
            end_slot: row.get(3)?,
            term: row.get(4)?,
            group_id: row.get(5)?,
            teacher_id: row.get(6)?,
            room_id: row.get(7)?,
            subject_code: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    /// 通用查询: WHERE 子句 + 参数, 按 星期 → 起始时段 排序
    fn query_entries<P: rusqlite::Params>(
        &self,
        where_clause: &str,
        params: P,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM schedule_entry WHERE {} ORDER BY {}, start_slot, group_id",
            ENTRY_COLUMNS, where_clause, DAY_ORDER_SQL
        );

        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params, Self::map_row)?
            .collect::<Result<Vec<ScheduleEntry>, _>>()?;

        Ok(entries)
    }

    /// 按条目ID查询
    pub fn find_by_id(&self, entry_id: &str) -> RepositoryResult<Option<ScheduleEntry>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM schedule_entry WHERE entry_id = ?1", ENTRY_COLUMNS);

        let entry = conn
            .query_row(&sql, params![entry_id], Self::map_row)
            .optional()?;

        Ok(entry)
    }

    /// 查询班级在某学期的课表
    pub fn find_by_group_and_term(
        &self,
        group_id: &str,
        term: &str,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        self.query_entries("group_id = ?1 AND term = ?2", params![group_id, term])
    }

    /// 查询教师在某学期的课表
    pub fn find_by_teacher_and_term(
        &self,
        teacher_id: &str,
        term: &str,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        self.query_entries("teacher_id = ?1 AND term = ?2", params![teacher_id, term])
    }

    /// 查询教室在某学期的课表
    pub fn find_by_room_and_term(
        &self,
        room_id: &str,
        term: &str,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        self.query_entries("room_id = ?1 AND term = ?2", params![room_id, term])
    }

    /// 统计某学期的条目数
    pub fn count_by_term(&self, term: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM schedule_entry WHERE term = ?1",
            params![term],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

// ==========================================
// EntryStore trait 实现
// ==========================================
impl EntryStore for ScheduleEntryRepository {
    fn find_by_day_and_term(&self, day: Day, term: &str) -> RepositoryResult<Vec<ScheduleEntry>> {
        self.query_entries("day = ?1 AND term = ?2", params![day.to_db_str(), term])
    }

    /// 写入条目
    ///
    /// # 并发控制
    /// 在 IMMEDIATE 事务内（先取得写锁）查询同学期同日、区间重叠且共享
    /// 任一资源维度的条目; 存在则回滚并返回 ConcurrentConflict。
    /// 多个进程共享同一数据库文件时同样有效。
    fn insert(&self, entry: &ScheduleEntry) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| {
                RepositoryError::DatabaseTransactionError(format!("开启写事务失败: {}", e))
            })?;

        let existing: Option<String> = tx
            .query_row(
                r#"
                SELECT entry_id FROM schedule_entry
                WHERE term = ?1
                  AND day = ?2
                  AND start_slot < ?3
                  AND end_slot > ?4
                  AND (
                        group_id = ?5
                        OR (?6 IS NOT NULL AND teacher_id = ?6)
                        OR (?7 IS NOT NULL AND room_id = ?7)
                  )
                ORDER BY start_slot
                LIMIT 1
                "#,
                params![
                    entry.term,
                    entry.day.to_db_str(),
                    entry.end_slot,
                    entry.start_slot,
                    entry.group_id,
                    entry.teacher_id,
                    entry.room_id,
                ],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(existing_entry_id) = existing {
            // tx 在此处 drop, 自动回滚
            return Err(RepositoryError::ConcurrentConflict {
                term: entry.term.clone(),
                day: entry.day.to_db_str().to_string(),
                existing_entry_id,
            });
        }

        tx.execute(
            r#"
            INSERT INTO schedule_entry (
                entry_id, day, start_slot, end_slot, term, group_id,
                teacher_id, room_id, subject_code, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                entry.entry_id,
                entry.day.to_db_str(),
                entry.start_slot,
                entry.end_slot,
                entry.term,
                entry.group_id,
                entry.teacher_id,
                entry.room_id,
                entry.subject_code,
                entry.created_at,
            ],
        )?;

        tx.commit().map_err(|e| {
            RepositoryError::DatabaseTransactionError(format!("提交写事务失败: {}", e))
        })?;
        Ok(entry.entry_id.clone())
    }

    fn delete_by_id(&self, entry_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM schedule_entry WHERE entry_id = ?1",
            params![entry_id],
        )?;
        Ok(affected > 0)
    }

    fn delete_by_group_and_term(&self, group_id: &str, term: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM schedule_entry WHERE group_id = ?1 AND term = ?2",
            params![group_id, term],
        )?;
        Ok(affected)
    }
}
