//! # export 子命令实现
//!
//! ## 功能
//! - 解析并筛选激发态
//! - 导出为 docx / csv / html
//!
//! ## 依赖关系
//! - 使用 `cli/export.rs` 定义的参数
//! - 使用 `filter.rs`, `export/`
//! - 使用 `utils/output.rs`

use crate::cli::export::{ExportArgs, ExportFormat};
use crate::commands::load_input;
use crate::error::Result;
use crate::export::{csv as csv_export, docx, html};
use crate::filter;
use crate::utils::output;

/// 执行 export 命令
pub fn execute(args: ExportArgs) -> Result<()> {
    let config = args.filter.to_config()?;
    let (parsed, labels) = load_input(&args.input)?;
    let states = filter::apply(parsed.states, &config);
    let output_path = args.output_path();

    match args.format {
        ExportFormat::Docx => docx::write_docx(&states, &labels, &output_path)?,
        ExportFormat::Csv => csv_export::write_csv(&states, &output_path)?,
        ExportFormat::Html => {
            let title = args.input.log.display().to_string();
            html::write_report(&states, &labels, &args.images, &output_path, &title)?
        }
    }

    output::print_success(&format!(
        "Exported {} states as {} to '{}'",
        states.len(),
        args.format,
        output_path.display()
    ));
    Ok(())
}
