//! # spectrum 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/spectrum.rs`

use crate::cli::common::{FilterArgs, InputArgs};
use crate::filter::StateSelector;
use crate::spectrum::SpectrumConfig;

use clap::Args;
use std::path::PathBuf;

/// spectrum 子命令参数
#[derive(Args, Debug)]
pub struct SpectrumArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Start wavelength in nm
    #[arg(long, default_value_t = 200.0)]
    pub from: f64,

    /// End wavelength in nm (exclusive)
    #[arg(long, default_value_t = 600.0)]
    pub to: f64,

    /// Don't normalize the curves to a maximum of 1
    #[arg(long)]
    pub nnorm: bool,

    /// Convert molar extinction coefficients to oscillator-strength scale
    #[arg(long)]
    pub e2f: bool,

    /// States whose impulses are written as an extra block (id, or id plus irrep such as 1b1)
    #[arg(long, num_args = 1..)]
    pub highlight: Vec<StateSelector>,

    /// Detect maxima of the nm curve and append them as an extra block
    #[arg(long)]
    pub peaks: bool,

    /// Peak detection window (samples)
    #[arg(long, default_value_t = 20)]
    pub lookahead: usize,

    /// Minimum drop after a peak to accept it
    #[arg(long, default_value_t = 0.0)]
    pub delta: f64,

    /// Render the nm spectrum to a PNG or SVG file
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Plot width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Plot height in pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Write the blocks to this file instead of stdout (a .csv extension writes <stem>_nm.csv and <stem>_ev.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SpectrumArgs {
    pub fn to_config(&self) -> SpectrumConfig {
        SpectrumConfig {
            from_nm: self.from,
            to_nm: self.to,
            normalize: !self.nnorm,
            e2f: self.e2f,
        }
    }
}
