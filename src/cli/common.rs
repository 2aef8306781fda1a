//! # 各子命令共用的参数
//!
//! - `InputArgs`: 输入文件、轨道名称文件、CI 系数阈值
//! - `FilterArgs`: 能量平移、置零与筛选/排序选项
//!
//! ## 依赖关系
//! - 被 `cli/show.rs`, `cli/spectrum.rs`, `cli/export.rs` 展开 (`flatten`)
//! - 转换为 `filter.rs` 的 FilterConfig

use crate::error::Result;
use crate::filter::{FilterConfig, SortOrder, WavelengthRange};

use clap::Args;
use std::path::PathBuf;

/// 输入参数
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Excited-state output (Gaussian .log, ORCA .out, TURBOMOLE escf.out / ricc2.out)
    pub log: PathBuf,

    /// Orbital label file (mos.json or <stem>_mos.csv); searched next to the log if omitted
    #[arg(long, env = "TD_MO_LABELS")]
    pub labels: Option<PathBuf>,

    /// CI coefficient threshold t: drop MO contributions whose weight is at most 2·t²
    #[arg(long, default_value_t = 0.2)]
    pub ci_coeff: f64,
}

/// 筛选与排序参数
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Constant added to every excitation energy (eV)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset: f64,

    /// Set all oscillator strengths to zero
    #[arg(long)]
    pub zero_osc: bool,

    /// Only keep states with oscillator strength >= this value
    #[arg(long, default_value_t = 0.0)]
    pub fthresh: f64,

    /// Sort by oscillator strength (descending) instead of energy
    #[arg(long)]
    pub sf: bool,

    /// Only keep states of this irrep
    #[arg(long)]
    pub irrep: Option<String>,

    /// Assign every state to the 'a' irrep
    #[arg(long)]
    pub nosym: bool,

    /// Wavelength window in nm: '400' (λ >= 400) or '400-450'
    #[arg(long)]
    pub range: Option<String>,

    /// Only keep states with a transition from one of these MOs
    #[arg(long, num_args = 1..)]
    pub start_mos: Vec<u32>,

    /// Only keep states with a transition to one of these MOs
    #[arg(long, num_args = 1..)]
    pub final_mos: Vec<u32>,

    /// MO pairs (start final ...); only keep states containing one of these transitions
    #[arg(long, num_args = 1..)]
    pub start_final_mos: Vec<u32>,

    /// Only consider the first n states of the file
    #[arg(long)]
    pub only_first: Option<usize>,

    /// Show at most n states
    #[arg(long)]
    pub show: Option<usize>,
}

impl FilterArgs {
    /// 转换为不可变的筛选配置
    pub fn to_config(&self) -> Result<FilterConfig> {
        let wavelength_range = match self.range {
            Some(ref range) => Some(WavelengthRange::parse(range)?),
            None => None,
        };

        Ok(FilterConfig {
            energy_offset: self.offset,
            zero_osc: self.zero_osc,
            nosym: self.nosym,
            only_first: self.only_first,
            irrep: self.irrep.clone(),
            start_mos: self.start_mos.clone(),
            final_mos: self.final_mos.clone(),
            start_final_mos: FilterConfig::pairs_from_flat(&self.start_final_mos)?,
            wavelength_range,
            threshold: self.fthresh,
            sort: if self.sf {
                SortOrder::Strength
            } else {
                SortOrder::Energy
            },
            show: self.show,
        })
    }
}
