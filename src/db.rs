// ==========================================
// 班级课表排课系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout, 减少并发写入时的偶发 busy 错误
// - 提供幂等的建表入口 (CREATE TABLE IF NOT EXISTS)
// ==========================================

use crate::domain::term::{DEFAULT_CURRENT_TERM, SEED_TERMS};
use chrono::Utc;
use rusqlite::OptionalExtension;
use rusqlite::{params, Connection};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
///
/// 表:
/// - schema_version: 版本记录
/// - config_scope / config_kv: 配置存储（当前学期等）
/// - term: 学期
/// - subject: 课程
/// - schedule_entry: 排课条目（带网格/午休 CHECK 约束）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS term (
            term_name TEXT PRIMARY KEY,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS subject (
            subject_code TEXT PRIMARY KEY,
            name_th TEXT,
            theory_hrs INTEGER,
            practice_hrs INTEGER,
            credits INTEGER
        );

        CREATE TABLE IF NOT EXISTS schedule_entry (
            entry_id TEXT PRIMARY KEY,
            day TEXT NOT NULL
                CHECK (day IN ('Monday', 'Tuesday', 'Wednesday', 'Thursday', 'Friday')),
            start_slot INTEGER NOT NULL,
            end_slot INTEGER NOT NULL,
            term TEXT NOT NULL,
            group_id TEXT NOT NULL,
            teacher_id TEXT,
            room_id TEXT,
            subject_code TEXT,
            created_at TEXT NOT NULL,
            CHECK (start_slot >= 1 AND start_slot < end_slot AND end_slot <= 14),
            CHECK (NOT (start_slot < 5 AND end_slot > 5))
        );

        CREATE INDEX IF NOT EXISTS idx_schedule_entry_term_day
            ON schedule_entry (term, day, start_slot);
        CREATE INDEX IF NOT EXISTS idx_schedule_entry_group_term
            ON schedule_entry (group_id, term);
        CREATE INDEX IF NOT EXISTS idx_schedule_entry_teacher_term
            ON schedule_entry (teacher_id, term);
        CREATE INDEX IF NOT EXISTS idx_schedule_entry_room_term
            ON schedule_entry (room_id, term);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 写入默认数据（幂等）
///
/// - 学期: 1/2568, 2/2568
/// - 当前学期: 未配置时设为 2/2568, 已配置时保持不变
pub fn seed_defaults(conn: &Connection) -> rusqlite::Result<()> {
    let now = Utc::now().naive_utc();
    for term in SEED_TERMS {
        conn.execute(
            "INSERT OR IGNORE INTO term (term_name, created_at) VALUES (?1, ?2)",
            params![term, now],
        )?;
    }

    conn.execute(
        r#"INSERT OR IGNORE INTO config_kv (scope_id, key, value)
           VALUES ('global', 'current_term', ?1)"#,
        params![DEFAULT_CURRENT_TERM],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_schedule_entry_check_rejects_lunch_crossing() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let result = conn.execute(
            r#"INSERT INTO schedule_entry
               (entry_id, day, start_slot, end_slot, term, group_id, created_at)
               VALUES ('E1', 'Monday', 4, 7, '2/2568', 'G1', '2026-01-01 08:00:00')"#,
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            r#"INSERT INTO schedule_entry
               (entry_id, day, start_slot, end_slot, term, group_id, created_at)
               VALUES ('E2', 'Saturday', 1, 2, '2/2568', 'G1', '2026-01-01 08:00:00')"#,
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_defaults_keeps_existing_current_term() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', 'current_term', '1/2568')",
            [],
        )
        .unwrap();

        seed_defaults(&conn).unwrap();
        seed_defaults(&conn).unwrap();

        let terms: i64 = conn
            .query_row("SELECT COUNT(*) FROM term", [], |row| row.get(0))
            .unwrap();
        assert_eq!(terms, 2);

        let current: String = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = 'current_term'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(current, "1/2568");
    }
}
