//! # export 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/export.rs`

use crate::cli::common::{FilterArgs, InputArgs};

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 导出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExportFormat {
    /// Word document with one table
    Docx,
    /// Comma-separated values
    Csv,
    /// HTML report with NTO images
    Html,
}

impl ExportFormat {
    /// 默认输出文件名
    pub fn default_output(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "export.docx",
            ExportFormat::Csv => "export.csv",
            ExportFormat::Html => "report.html",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Docx => write!(f, "docx"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Html => write!(f, "html"),
        }
    }
}

/// export 子命令参数
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Export format
    #[arg(long, value_enum, default_value_t = ExportFormat::Docx)]
    pub format: ExportFormat,

    /// Output file (default: export.docx, export.csv or report.html)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory with NTO images (html only)
    #[arg(long, default_value = "nto")]
    pub images: PathBuf,
}

impl ExportArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.format.default_output()))
    }
}
