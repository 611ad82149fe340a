// ==========================================
// 班级课表排课系统 - 课程数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::Subject;
use crate::engine::collaborators::SubjectLookup;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SubjectRepository - 课程仓储
// ==========================================
pub struct SubjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SubjectRepository {
    /// 创建新的SubjectRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // 学时列允许 NULL, 统一按 0 处理
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
        Ok(Subject {
            subject_code: row.get(0)?,
            name_th: row.get(1)?,
            theory_hrs: row.get::<_, Option<i32>>(2)?.unwrap_or(0),
            practice_hrs: row.get::<_, Option<i32>>(3)?.unwrap_or(0),
            credits: row.get::<_, Option<i32>>(4)?.unwrap_or(0),
        })
    }

    /// 插入或更新课程（按 subject_code）
    pub fn upsert(&self, subject: &Subject) -> RepositoryResult<()> {
        let code = subject.subject_code.trim();
        if code.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "subject_code".to_string(),
                message: "课程代码不能为空".to_string(),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO subject (subject_code, name_th, theory_hrs, practice_hrs, credits)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(subject_code) DO UPDATE SET
                name_th = excluded.name_th,
                theory_hrs = excluded.theory_hrs,
                practice_hrs = excluded.practice_hrs,
                credits = excluded.credits
            "#,
            params![
                code,
                subject.name_th,
                subject.theory_hrs,
                subject.practice_hrs,
                subject.credits,
            ],
        )?;

        Ok(())
    }

    /// 按课程代码查询
    pub fn find_by_code(&self, subject_code: &str) -> RepositoryResult<Option<Subject>> {
        let conn = self.get_conn()?;
        let subject = conn
            .query_row(
                r#"SELECT subject_code, name_th, theory_hrs, practice_hrs, credits
                   FROM subject WHERE subject_code = ?1"#,
                params![subject_code.trim()],
                Self::map_row,
            )
            .optional()?;
        Ok(subject)
    }

    /// 查询全部课程（按代码升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Subject>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT subject_code, name_th, theory_hrs, practice_hrs, credits
               FROM subject ORDER BY subject_code ASC"#,
        )?;
        let subjects = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<Subject>, _>>()?;
        Ok(subjects)
    }

    /// 删除课程
    ///
    /// 说明: 不级联删除已排课条目, 条目保留原课程代码
    pub fn delete_by_code(&self, subject_code: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM subject WHERE subject_code = ?1",
            params![subject_code.trim()],
        )?;
        Ok(affected > 0)
    }
}

impl SubjectLookup for SubjectRepository {
    fn find_subject(&self, subject_code: &str) -> RepositoryResult<Option<Subject>> {
        self.find_by_code(subject_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> (Arc<Mutex<Connection>>, SubjectRepository) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (conn.clone(), SubjectRepository::new(conn))
    }

    #[test]
    fn test_upsert_and_find() {
        let (_conn, repo) = setup_repo();
        let mut subject = Subject::new("30901-2001", 2, 2);
        subject.name_th = Some("การเขียนโปรแกรม".to_string());
        subject.credits = 3;
        repo.upsert(&subject).unwrap();

        let found = repo.find_by_code("30901-2001").unwrap().unwrap();
        assert_eq!(found, subject);
        assert_eq!(found.duration(), 4);

        // 更新学时
        subject.practice_hrs = 0;
        repo.upsert(&subject).unwrap();
        assert_eq!(repo.find_subject("30901-2001").unwrap().unwrap().duration(), 2);
    }

    #[test]
    fn test_null_hours_read_as_zero() {
        let (conn, repo) = setup_repo();
        conn.lock()
            .unwrap()
            .execute("INSERT INTO subject (subject_code) VALUES ('NULLS')", [])
            .unwrap();

        let found = repo.find_by_code("NULLS").unwrap().unwrap();
        assert_eq!(found.theory_hrs, 0);
        assert_eq!(found.practice_hrs, 0);
        assert_eq!(found.duration(), 0);
    }

    #[test]
    fn test_list_sorted_and_delete() {
        let (_conn, repo) = setup_repo();
        repo.upsert(&Subject::new("B", 1, 0)).unwrap();
        repo.upsert(&Subject::new("A", 1, 0)).unwrap();

        let codes: Vec<String> = repo
            .list_all()
            .unwrap()
            .into_iter()
            .map(|s| s.subject_code)
            .collect();
        assert_eq!(codes, vec!["A", "B"]);

        assert!(repo.delete_by_code("A").unwrap());
        assert!(!repo.delete_by_code("A").unwrap());
        assert!(repo.find_by_code("A").unwrap().is_none());
    }

    #[test]
    fn test_upsert_rejects_blank_code() {
        let (_conn, repo) = setup_repo();
        let err = repo.upsert(&Subject::new("   ", 1, 0)).unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { .. }));
    }
}
