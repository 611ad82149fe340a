// ==========================================
// 班级课表排课系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================
// 当前学期持久化在 config_kv 中, 每次请求开始时读取,
// 不在进程内存中缓存, 重启后依然有效
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::term::DEFAULT_CURRENT_TERM;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at"#,
            params![key, value],
        )?;

        tracing::debug!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    // ===== 学期配置 =====

    /// 获取当前学期
    ///
    /// 未配置或配置为空白时回退到默认学期 (2/2568)
    pub fn get_current_term(&self) -> RepositoryResult<String> {
        let value = self.get_config_or_default(config_keys::CURRENT_TERM, DEFAULT_CURRENT_TERM)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            tracing::warn!(
                config_key = config_keys::CURRENT_TERM,
                "当前学期配置为空，使用默认值"
            );
            return Ok(DEFAULT_CURRENT_TERM.to_string());
        }
        Ok(trimmed.to_string())
    }

    /// 设置当前学期
    ///
    /// 说明：是否为已登记学期由调用方（API 层）校验
    pub fn set_current_term(&self, term: &str) -> RepositoryResult<()> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: config_keys::CURRENT_TERM.to_string(),
                message: "学期不能为空".to_string(),
            });
        }
        self.set_global_config_value(config_keys::CURRENT_TERM, trimmed)
    }

    /// 当前学期是否已显式配置
    pub fn has_current_term(&self) -> RepositoryResult<bool> {
        Ok(self.get_global_config_value(config_keys::CURRENT_TERM)?.is_some())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 返回
    /// - Ok(String): 配置快照的JSON字符串（按 key 排序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&json!(config_map))
            .map_err(|e| RepositoryError::InternalError(format!("配置快照序列化失败: {}", e)))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 当前学期
    pub const CURRENT_TERM: &str = "current_term";
}
