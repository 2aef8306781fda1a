//! # tdkit - 激发态计算输出分析工具
//!
//! 解析 Gaussian、ORCA 和 TURBOMOLE (escf/ricc2) 的激发态输出，
//! 输出筛选后的表格、展宽 UV-Vis 光谱以及 docx/csv/html 报告。
//!
//! ## 子命令
//! - `show` - 激发态表格
//! - `spectrum` - 展宽光谱
//! - `export` - 文档导出
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (格式识别与解析)
//!   │     ├── filter.rs  (筛选与排序)
//!   │     ├── spectrum/  (光谱展宽、峰值、绘图)
//!   │     ├── export/    (表格与文档导出)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod error;
mod export;
mod filter;
mod models;
mod parsers;
mod spectrum;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}

/// 初始化日志：默认 warn，`-v` info，`-vv` debug；`RUST_LOG` 优先
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
