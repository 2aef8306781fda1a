//! # show 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/show.rs`

use crate::cli::common::{FilterArgs, InputArgs};
use crate::filter::StateSelector;

use clap::{Args, ValueEnum};

/// 表格格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum TableFormat {
    /// Terminal table with header
    #[default]
    Pretty,
    /// Tab-separated values without header
    Raw,
    /// LaTeX booktabs tabular
    Booktabs,
    /// TiddlyWiki table
    Tiddly,
    /// One table per state followed by its MO transitions
    Summary,
    /// CSV on stdout
    Csv,
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableFormat::Pretty => write!(f, "pretty"),
            TableFormat::Raw => write!(f, "raw"),
            TableFormat::Booktabs => write!(f, "booktabs"),
            TableFormat::Tiddly => write!(f, "tiddly"),
            TableFormat::Summary => write!(f, "summary"),
            TableFormat::Csv => write!(f, "csv"),
        }
    }
}

/// show 子命令参数
#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = TableFormat::Pretty)]
    pub format: TableFormat,

    /// Split the pretty table into groups of k states (0 = no grouping)
    #[arg(long, default_value_t = 0)]
    pub chunks: usize,

    /// Show only this state and its MO transitions; add the irrep when ids repeat across irreps (e.g. 1b1)
    #[arg(long)]
    pub by_id: Option<StateSelector>,

    /// Excitation wavelength (nm) for resonance-Raman weights
    #[arg(long)]
    pub exc: Option<f64>,

    /// Only list resonance-Raman weights >= this value
    #[arg(long, default_value_t = 1e-2)]
    pub rrthresh: f64,
}
