//! 领域层统一错误定义
//!
//! 只覆盖仓储与存储后端会遇到的最小集合：序列化、文件 I/O、记录缺失与类型错配。
//! 查询未命中（`get`/`get_by_spec`/`delete` 找不到记录）不是错误，以 `None` 或空操作表达。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化/存储 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("corrupted store: {reason}")]
    CorruptedStore { reason: String },

    // --- 仓储 ---
    #[error("not found: {reason}")]
    NotFound { reason: String },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },
}

impl DomainError {
    pub fn not_found(reason: impl Into<String>) -> Self {
        DomainError::NotFound {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
