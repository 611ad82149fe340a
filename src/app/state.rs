// ==========================================
// 班级课表排课系统 - 应用状态
// ==========================================
// 职责: 组装 数据库连接 → 仓储 → 引擎 → API
// 约束: 进程内所有 API 共享同一连接与同一分配引擎 (时段锁)
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ScheduleApi, SubjectApi, TermApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, seed_defaults};
use crate::engine::AllocationEngine;
use crate::repository::{ScheduleEntryRepository, SubjectRepository, TermRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "CLASS_TIMETABLE_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 排课API
    pub schedule_api: Arc<ScheduleApi>,

    /// 学期API
    pub term_api: Arc<TermApi>,

    /// 课程API
    pub subject_api: Arc<SubjectApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表、写入默认学期
    /// 2. 初始化所有Repository
    /// 3. 创建分配引擎与所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        seed_defaults(&conn).map_err(|e| format!("默认数据写入失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let entry_repo = Arc::new(ScheduleEntryRepository::new(conn.clone()));
        let subject_repo = Arc::new(SubjectRepository::new(conn.clone()));
        let term_repo = Arc::new(TermRepository::new(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化Engine层与API层
        // ==========================================
        let engine = Arc::new(AllocationEngine::new());

        let schedule_api = Arc::new(ScheduleApi::new(
            engine,
            entry_repo,
            subject_repo.clone(),
            config_manager.clone(),
        ));
        let term_api = Arc::new(TermApi::new(term_repo, config_manager.clone()));
        let subject_api = Arc::new(SubjectApi::new(subject_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            schedule_api,
            term_api,
            subject_api,
            config_manager,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

/// 获取默认数据库路径
///
/// # 优先级
/// 1. 环境变量 CLASS_TIMETABLE_DB_PATH
/// 2. 用户数据目录/class-timetable/class_timetable.db
/// 3. ./class_timetable.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./class_timetable.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("class-timetable");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("class_timetable.db");
        }
    }

    path.to_string_lossy().to_string()
}
