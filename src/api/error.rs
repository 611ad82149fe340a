// ==========================================
// 班级课表排课系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换仓储/引擎错误为用户可读的错误消息
// 红线: 排课拒绝必须原样保留拒绝原因 (星期/学期/维度)
// ==========================================

use crate::domain::{Day, Operation, Role};
use crate::engine::reject::{AllocationError, RejectReason};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 排课拒绝
    // ==========================================
    #[error("排课被拒绝: {0}")]
    Rejected(RejectReason),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("权限不足: role={role}, operation={operation}")]
    PermissionDenied { role: Role, operation: Operation },

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 若为排课拒绝则返回拒绝原因
    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            ApiError::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发控制错误: 存储层检测到的竞争同样是拒绝
            RepositoryError::ConcurrentConflict {
                term,
                day,
                existing_entry_id,
            } => match Day::parse(&day) {
                Some(day) => ApiError::Rejected(RejectReason::ConcurrentConflict {
                    term,
                    day,
                    existing_entry_id,
                }),
                None => ApiError::InternalError(format!("非法的星期取值: {}", day)),
            },

            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => {
                ApiError::ValidationError(format!("CHECK 约束违反: {}", msg))
            }

            // 数据质量错误
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 AllocationError 转换
// ==========================================
impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::Rejected(reason) => ApiError::Rejected(reason),
            AllocationError::Repository(err) => err.into(),
        }
    }
}

impl From<RejectReason> for ApiError {
    fn from(reason: RejectReason) -> Self {
        ApiError::Rejected(reason)
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
