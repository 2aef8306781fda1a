//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `show`: 筛选/排序后的激发态表格
//! - `spectrum`: 展宽 UV-Vis 光谱
//! - `export`: 导出为 docx / csv / html
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: common, show, spectrum, export

pub mod common;
pub mod export;
pub mod show;
pub mod spectrum;

use clap::{ArgAction, Parser, Subcommand};

/// tdkit - 激发态计算输出分析工具
#[derive(Parser)]
#[command(name = "tdkit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Inspect excited states from Gaussian, ORCA and TURBOMOLE outputs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Print a filtered and sorted table of excited states
    Show(show::ShowArgs),

    /// Compute a Gaussian-broadened UV-Vis spectrum
    Spectrum(spectrum::SpectrumArgs),

    /// Export excited states to docx, csv or an HTML report
    Export(export::ExportArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show_with_filters() {
        let cli = Cli::try_parse_from([
            "tdkit", "-v", "show", "job.log", "--sf", "--fthresh", "0.05", "--offset", "-0.2",
            "--start-final-mos", "45", "46", "--format", "booktabs",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert!(args.filter.sf);
        assert_eq!(args.filter.offset, -0.2);
        assert_eq!(args.filter.start_final_mos, vec![45, 46]);
        assert_eq!(args.format, show::TableFormat::Booktabs);
        assert_eq!(args.input.ci_coeff, 0.2);
    }

    #[test]
    fn test_parse_spectrum_defaults() {
        let cli = Cli::try_parse_from(["tdkit", "spectrum", "job.log", "--highlight", "1", "3b1"]).unwrap();
        let Commands::Spectrum(args) = cli.command else {
            panic!("expected spectrum");
        };
        assert_eq!(args.from, 200.0);
        assert_eq!(args.to, 600.0);
        assert!(!args.nnorm);
        let highlight: Vec<String> = args.highlight.iter().map(|s| s.to_string()).collect();
        assert_eq!(highlight, vec!["1", "3b1"]);
    }

    #[test]
    fn test_parse_export() {
        let cli = Cli::try_parse_from(["tdkit", "export", "job.log", "--format", "csv"]).unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.format, export::ExportFormat::Csv);
        assert_eq!(args.output_path(), std::path::PathBuf::from("export.csv"));
    }
}
