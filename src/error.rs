//! # 统一错误处理模块
//!
//! 定义 tdkit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误传播策略
//! - `UnrecognizedFormat`: 立即中止，不产生任何输出
//! - `MalformedRecord`: 由解析器记录警告后跳过该激发态
//! - `MissingLabelFile`: 非致命，回退到原始轨道编号
//! - `ExportDependencyMissing`: 导出格式所需的可选组件未编译
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// tdkit 统一错误类型
#[derive(Error, Debug)]
pub enum TdError {
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

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unrecognized log format: {path}\nExpected Gaussian, ORCA or TURBOMOLE (escf/ricc2) output")]
    UnrecognizedFormat { path: String },

    #[error("Malformed {format} state block #{state}: {reason}")]
    MalformedRecord {
        format: String,
        state: String,
        reason: String,
    },

    #[error("Orbital label file not found: {path}")]
    MissingLabelFile { path: String },

    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 导出错误
    // ─────────────────────────────────────────────────────────────
    #[error("Export format '{format}' is unavailable: this build lacks the '{feature}' feature\nRebuild with `--features {feature}`")]
    ExportDependencyMissing { format: String, feature: String },

    #[error("Plotting failed: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    #[error("Excited state {id} not found")]
    StateNotFound { id: String },

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl TdError {
    /// 构造 `MalformedRecord`
    pub fn malformed(format: &str, state: impl ToString, reason: impl Into<String>) -> Self {
        TdError::MalformedRecord {
            format: format.to_string(),
            state: state.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, TdError>;
