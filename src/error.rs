//! # 统一错误处理模块
//!
//! 定义 GrrmKit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - `Format`: 单条记录解析失败（缺少标签、数字不合法、坐标行字段不足），
//!   始终携带出错的原始行
//! - `Consistency`: 日志结构不可恢复（如 IRC 中出现两个 INITIAL STRUCTURE）
//! - 可选段落缺失（无 Thermochemistry、无 AFIR path 等）不是错误，
//!   以 `Option` / 空列表表示
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// GrrmKit 统一错误类型
#[derive(Error, Debug)]
pub enum GrrmKitError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed {what}: '{line}'")]
    Format { what: String, line: String },

    #[error("Inconsistent log structure: {0}")]
    Consistency(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    #[error("{0}")]
    Other(String),
}

impl GrrmKitError {
    /// 构造解析错误的便捷方法
    pub fn format(what: impl Into<String>, line: impl Into<String>) -> Self {
        GrrmKitError::Format {
            what: what.into(),
            line: line.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, GrrmKitError>;
