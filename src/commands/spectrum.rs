//! # spectrum 子命令实现
//!
//! ## 功能
//! - 解析并筛选激发态
//! - 在 nm / eV 网格上生成展宽光谱
//! - 可选高亮脉冲、峰值检测、图表
//! - 数据块输出到 stdout 或文件（`.csv` 扩展名时输出两个 CSV）
//!
//! ## 依赖关系
//! - 使用 `cli/spectrum.rs` 定义的参数
//! - 使用 `filter.rs`, `spectrum/`
//! - 使用 `utils/output.rs`

use crate::cli::spectrum::SpectrumArgs;
use crate::commands::load_input;
use crate::error::{Result, TdError};
use crate::filter;
use crate::spectrum::export::{self, ExtraBlocks};
use crate::spectrum::plot::{self, PlotOptions};
use crate::spectrum::{peaks, Spectrum};
use crate::utils::output;

use std::io;
use std::path::Path;

/// 执行 spectrum 命令
pub fn execute(args: SpectrumArgs) -> Result<()> {
    let filter_config = args.filter.to_config()?;
    let spectrum_config = args.to_config();
    spectrum_config.validate()?;

    let (parsed, _labels) = load_input(&args.input)?;
    let states = filter::apply(parsed.states, &filter_config);

    output::print_info(&format!(
        "Broadening {} states over {}-{} nm",
        states.len(),
        args.from,
        args.to
    ));
    let spectrum = Spectrum::generate(&states, &spectrum_config)?;
    if let Some((nm, y)) = spectrum.nm_maximum() {
        output::print_info(&format!("Band maximum {:.4e} at {:.1} nm", y, nm));
    }

    // 高亮脉冲
    let mut highlighted = Vec::new();
    for selector in &args.highlight {
        match selector.resolve(&states) {
            Ok(s) => highlighted.push((s.wavelength_nm(), s.osc)),
            Err(e) => output::print_warning(&format!("Cannot highlight state {}: {}", selector, e)),
        }
    }

    let maxima = if args.peaks {
        let extrema = peaks::detect(&spectrum.nm_curve, args.lookahead, args.delta)?;
        output::print_info(&format!(
            "Found {} maxima and {} minima",
            extrema.maxima.len(),
            extrema.minima.len()
        ));
        Some(extrema.maxima)
    } else {
        None
    };

    if let Some(ref plot_path) = args.plot {
        let title = args
            .input
            .log
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("spectrum");
        let options = PlotOptions {
            title,
            width: args.width,
            height: args.height,
            highlighted: &highlighted,
            maxima: maxima.as_deref().unwrap_or(&[]),
        };
        plot::generate_spectrum_plot(&spectrum, plot_path, &options)?;
        output::print_success(&format!("Spectrum plot saved to '{}'", plot_path.display()));
    }

    let extras = ExtraBlocks { highlighted, maxima };

    match args.output {
        Some(ref path) if is_csv(path) => {
            let (nm_path, ev_path) = csv_paths(path);
            export::curve_to_csv(&spectrum.nm_curve, "wavelength_nm", &nm_path)?;
            export::curve_to_csv(&spectrum.ev_curve, "energy_ev", &ev_path)?;
            output::print_success(&format!(
                "Spectrum saved to '{}' and '{}'",
                nm_path.display(),
                ev_path.display()
            ));
        }
        Some(ref path) => {
            export::blocks_to_file(&spectrum, &extras, path)?;
            output::print_success(&format!("Spectrum saved to '{}'", path.display()));
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            export::write_blocks(&mut handle, &spectrum, &extras)
                .map_err(|e| TdError::Other(format!("Failed to write spectrum: {}", e)))?;
        }
    }

    Ok(())
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// `out.csv` -> (`out_nm.csv`, `out_ev.csv`)
fn csv_paths(path: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("spectrum");
    (
        path.with_file_name(format!("{}_nm.csv", stem)),
        path.with_file_name(format!("{}_ev.csv", stem)),
    )
}
