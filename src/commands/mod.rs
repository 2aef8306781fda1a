//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `filter.rs`, `utils/`
//! - 子模块: show, spectrum, export

pub mod export;
pub mod show;
pub mod spectrum;

use crate::cli::common::InputArgs;
use crate::cli::Commands;
use crate::error::Result;
use crate::parsers::{self, OrbitalLabels, ParsedLog};
use crate::utils::output;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Show(args) => show::execute(args),
        Commands::Spectrum(args) => spectrum::execute(args),
        Commands::Export(args) => export::execute(args),
    }
}

/// 解析输入文件并加载轨道名称
pub(crate) fn load_input(input: &InputArgs) -> Result<(ParsedLog, OrbitalLabels)> {
    let parsed = parsers::parse_log_file(&input.log, input.ci_coeff)?;

    output::print_info(&format!(
        "Read {} excited states from {} output '{}'",
        parsed.states.len(),
        parsed.format,
        input.log.display()
    ));
    if parsed.skipped > 0 {
        output::print_warning(&format!(
            "Skipped {} malformed state block(s)",
            parsed.skipped
        ));
    }

    let labels = OrbitalLabels::load_or_empty(input.labels.as_deref(), &input.log);
    Ok((parsed, labels))
}
