// ==========================================
// 班级课表排课系统 - 学期数据仓储
// ==========================================

use crate::domain::Term;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct TermRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TermRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查找或创建学期（名称去除首尾空白）
    ///
    /// # 返回
    /// - Ok(true): 新建
    /// - Ok(false): 已存在
    pub fn find_or_create(&self, term_name: &str) -> RepositoryResult<bool> {
        let name = term_name.trim();
        if name.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "term_name".to_string(),
                message: "学期名称不能为空".to_string(),
            });
        }

        let conn = self.get_conn()?;
        let affected = conn.execute(
            "INSERT OR IGNORE INTO term (term_name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().naive_utc()],
        )?;
        Ok(affected > 0)
    }

    pub fn exists(&self, term_name: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM term WHERE term_name = ?1",
            params![term_name.trim()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 查询全部学期（名称降序, 最新学期在前）
    pub fn list_all(&self) -> RepositoryResult<Vec<Term>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT term_name, created_at FROM term ORDER BY term_name DESC")?;
        let terms = stmt
            .query_map([], |row| {
                Ok(Term {
                    term_name: row.get(0)?,
                    created_at: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<Term>, _>>()?;
        Ok(terms)
    }

    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM term", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> TermRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        TermRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_find_or_create_is_idempotent() {
        let repo = setup_repo();
        assert!(repo.find_or_create(" 1/2569 ").unwrap());
        assert!(!repo.find_or_create("1/2569").unwrap());
        assert!(repo.exists("1/2569").unwrap());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_list_orders_desc() {
        let repo = setup_repo();
        repo.find_or_create("1/2568").unwrap();
        repo.find_or_create("2/2568").unwrap();

        let names: Vec<String> = repo.list_all().unwrap().into_iter().map(|t| t.term_name).collect();
        assert_eq!(names, vec!["2/2568", "1/2568"]);
    }

    #[test]
    fn test_blank_term_rejected() {
        let repo = setup_repo();
        assert!(repo.find_or_create("  ").is_err());
    }
}
