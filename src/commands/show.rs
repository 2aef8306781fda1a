//! # show 子命令实现
//!
//! ## 功能
//! - 解析输出文件并按筛选配置处理
//! - 以选定格式打印表格到 stdout
//! - 可选共振拉曼权重表
//! - pretty 格式后附 CI 阈值与各对称性轨道范围
//!
//! ## 依赖关系
//! - 使用 `cli/show.rs` 定义的参数
//! - 使用 `filter.rs`, `export/text.rs`, `export/csv.rs`
//! - 使用 `utils/output.rs`

use crate::cli::show::{ShowArgs, TableFormat};
use crate::commands::load_input;
use crate::error::{Result, TdError};
use crate::export::{csv as csv_export, text};
use crate::filter::{self, FilterConfig, StateSelector};
use crate::models::ExcitedState;
use crate::utils::output;

use std::io;

/// 执行 show 命令
pub fn execute(args: ShowArgs) -> Result<()> {
    let config = args.filter.to_config()?;
    let (parsed, labels) = load_input(&args.input)?;

    if let Some(ref selector) = args.by_id {
        let state = select_state(parsed.states, &config, selector)?;
        print!("{}", text::summary(std::slice::from_ref(&state), &labels));
        return Ok(());
    }

    let mut states = filter::apply(parsed.states, &config);
    if states.is_empty() {
        output::print_warning("No excited states match the given filters");
    }

    if let Some(exc) = args.exc {
        if exc <= 0.0 {
            return Err(TdError::InvalidArgument(format!(
                "--exc must be a positive wavelength, got {}",
                exc
            )));
        }
        for state in states.iter_mut() {
            state.calc_rr_weight(exc);
        }
    }

    match args.format {
        TableFormat::Pretty => {
            println!("{}", text::pretty(&states, args.chunks));
            if let Some(table) = text::rr_table(&states, args.rrthresh) {
                println!("Resonance-Raman weights at {} nm:", args.exc.unwrap_or_default());
                println!("{}", table);
            }
            println!("{}", text::footer(&states, args.input.ci_coeff));
        }
        TableFormat::Raw => println!("{}", text::raw(&states)),
        TableFormat::Booktabs => println!("{}", text::booktabs(&states)),
        TableFormat::Tiddly => println!("{}", text::tiddly(&states, &labels)),
        TableFormat::Summary => print!("{}", text::summary(&states, &labels)),
        TableFormat::Csv => csv_export::to_writer(&states, io::stdout().lock())?,
    }

    Ok(())
}

/// `--by-id`：只做能量平移等调整，忽略其余筛选条件
fn select_state(
    mut states: Vec<ExcitedState>,
    config: &FilterConfig,
    selector: &StateSelector,
) -> Result<ExcitedState> {
    filter::adjust(&mut states, config);
    selector.resolve(&states).cloned()
}
