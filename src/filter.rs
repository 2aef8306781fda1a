//! # 筛选与排序
//!
//! 对提取出的激发态按配置进行能量平移、振子强度置零、筛选、排序和分组。
//!
//! ## 处理顺序
//! 能量平移 → 置零 → nosym → only_first → 筛选（对称性/轨道/波长/阈值）→ 排序 → show 截断
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/excited_state.rs`

use crate::error::{Result, TdError};
use crate::models::ExcitedState;

use std::cmp::Ordering;

/// 排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// 按激发能升序（默认）
    #[default]
    Energy,
    /// 按振子强度降序
    Strength,
}

/// 波长窗口 (nm)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WavelengthRange {
    /// 只保留 λ ≥ min 的激发态
    AtLeast(f64),
    /// 保留 min ≤ λ ≤ max 的激发态
    Between(f64, f64),
}

impl WavelengthRange {
    /// 解析 "400" 或 "400-450"
    pub fn parse(range: &str) -> Result<Self> {
        let parts: Vec<&str> = range.split('-').map(|s| s.trim()).collect();
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| TdError::InvalidRange(range.to_string()))
        };
        match parts.as_slice() {
            [min] => Ok(WavelengthRange::AtLeast(parse(min)?)),
            [min, max] => {
                let (min, max) = (parse(min)?, parse(max)?);
                if max < min {
                    return Err(TdError::InvalidRange(format!(
                        "{} (must be min <= max)",
                        range
                    )));
                }
                Ok(WavelengthRange::Between(min, max))
            }
            _ => Err(TdError::InvalidRange(range.to_string())),
        }
    }

    pub fn contains(&self, nm: f64) -> bool {
        match *self {
            WavelengthRange::AtLeast(min) => nm >= min,
            WavelengthRange::Between(min, max) => (min..=max).contains(&nm),
        }
    }
}

/// 按编号选择激发态，可带对称性后缀：`3` 或 `3b1`
///
/// TURBOMOLE 的态编号在各不可约表示内重新计数，不带后缀的编号
/// 在多个对称性中出现时视为有歧义。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSelector {
    pub id: usize,
    pub irrep: Option<String>,
}

impl StateSelector {
    pub fn matches(&self, state: &ExcitedState) -> bool {
        state.id == self.id
            && self
                .irrep
                .as_ref()
                .map_or(true, |irrep| irrep.eq_ignore_ascii_case(&state.irrep))
    }

    /// 在激发态列表中查找唯一匹配项
    pub fn resolve<'a>(&self, states: &'a [ExcitedState]) -> Result<&'a ExcitedState> {
        let found: Vec<&ExcitedState> = states.iter().filter(|s| self.matches(s)).collect();
        match found.as_slice() {
            [] => Err(TdError::StateNotFound { id: self.to_string() }),
            [state] => Ok(state),
            many => {
                let irreps: Vec<&str> = many.iter().map(|s| s.irrep.as_str()).collect();
                Err(TdError::InvalidArgument(format!(
                    "state {} exists in several irreps ({}); qualify it, e.g. {}{}",
                    self,
                    irreps.join(", "),
                    self.id,
                    irreps[0]
                )))
            }
        }
    }
}

impl std::str::FromStr for StateSelector {
    type Err = TdError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, irrep) = s.split_at(split);
        let id = digits
            .parse::<usize>()
            .map_err(|_| TdError::InvalidArgument(format!("invalid state selector '{}'", s)))?;
        let irrep = (!irrep.is_empty()).then(|| irrep.to_string());
        Ok(StateSelector { id, irrep })
    }
}

impl std::fmt::Display for StateSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.id, self.irrep.as_deref().unwrap_or(""))
    }
}

/// 筛选配置（由命令行参数一次性构造）
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// 加到每个激发能上的常数 (eV)
    pub energy_offset: f64,
    /// 将所有振子强度置零
    pub zero_osc: bool,
    /// 将所有激发态归为 "a" 对称性
    pub nosym: bool,
    /// 只考虑前 n 个激发态（输出顺序）
    pub only_first: Option<usize>,
    /// 只保留该对称性
    pub irrep: Option<String>,
    /// 包含任一给体轨道
    pub start_mos: Vec<u32>,
    /// 包含任一受体轨道
    pub final_mos: Vec<u32>,
    /// 包含任一 (给体, 受体) 轨道对
    pub start_final_mos: Vec<(u32, u32)>,
    pub wavelength_range: Option<WavelengthRange>,
    /// 振子强度下限
    pub threshold: f64,
    pub sort: SortOrder,
    /// 最多显示 n 个
    pub show: Option<usize>,
}

impl FilterConfig {
    /// 将扁平列表解析为轨道对
    pub fn pairs_from_flat(mos: &[u32]) -> Result<Vec<(u32, u32)>> {
        if mos.len() % 2 != 0 {
            return Err(TdError::InvalidArgument(
                "--start-final-mos needs an even number of orbitals".to_string(),
            ));
        }
        Ok(mos.chunks(2).map(|p| (p[0], p[1])).collect())
    }
}

/// 能量平移和置零，作用于全部激发态（也用于光谱计算）
pub fn adjust(states: &mut [ExcitedState], config: &FilterConfig) {
    for state in states.iter_mut() {
        state.energy_ev += config.energy_offset;
        if config.zero_osc {
            state.osc = 0.0;
        }
        if config.nosym {
            state.irrep = "a".to_string();
        }
    }
}

/// 按配置依次处理激发态
pub fn apply(mut states: Vec<ExcitedState>, config: &FilterConfig) -> Vec<ExcitedState> {
    adjust(&mut states, config);

    if let Some(n) = config.only_first {
        states.truncate(n);
    }

    if let Some(ref irrep) = config.irrep {
        states.retain(|s| &s.irrep == irrep);
    }
    if !config.start_mos.is_empty() {
        states.retain(|s| {
            let mos = s.start_mos();
            config.start_mos.iter().any(|mo| mos.contains(mo))
        });
    }
    if !config.final_mos.is_empty() {
        states.retain(|s| {
            let mos = s.final_mos();
            config.final_mos.iter().any(|mo| mos.contains(mo))
        });
    }
    if !config.start_final_mos.is_empty() {
        states.retain(|s| {
            config
                .start_final_mos
                .iter()
                .any(|&(from, to)| s.has_transition(from, to))
        });
    }
    if let Some(range) = config.wavelength_range {
        states.retain(|s| range.contains(s.wavelength_nm()));
    }
    if config.threshold > 0.0 {
        states.retain(|s| s.osc >= config.threshold);
    }

    sort(&mut states, config.sort);

    if let Some(n) = config.show {
        states.truncate(n);
    }

    states
}

/// 稳定排序
pub fn sort(states: &mut [ExcitedState], order: SortOrder) {
    match order {
        SortOrder::Energy => states.sort_by(|a, b| {
            a.energy_ev
                .partial_cmp(&b.energy_ev)
                .unwrap_or(Ordering::Equal)
        }),
        SortOrder::Strength => {
            states.sort_by(|a, b| b.osc.partial_cmp(&a.osc).unwrap_or(Ordering::Equal))
        }
    }
}

/// 将序列切分为连续的固定大小分组（`size == 0` 时为单一分组）
pub fn chunk(states: &[ExcitedState], size: usize) -> Vec<&[ExcitedState]> {
    if size == 0 {
        return vec![states];
    }
    states.chunks(size).collect()
}
