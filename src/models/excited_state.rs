//! # 激发态数据模型
//!
//! 存储从 Gaussian/ORCA/TURBOMOLE 输出中提取的单个电子跃迁。
//!
//! ## 依赖关系
//! - 被 `parsers/` 构造
//! - 被 `filter.rs`, `spectrum/`, `export/`, `commands/` 使用

use crate::models::units;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 轨道自旋
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Spin {
    #[default]
    Alpha,
    Beta,
}

impl Spin {
    /// 从输出中的自旋标记解析（"alpha"/"beta"/"a"/"b"/"A"/"B"），无法识别时为 alpha
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "beta" | "b" => Spin::Beta,
            _ => Spin::Alpha,
        }
    }

    /// 单字符缩写
    pub fn short(&self) -> char {
        match self {
            Spin::Alpha => 'a',
            Spin::Beta => 'b',
        }
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spin::Alpha => write!(f, "alpha"),
            Spin::Beta => write!(f, "beta"),
        }
    }
}

/// 分子轨道标识（编号 + 不可约表示 + 自旋）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orbital {
    pub number: u32,
    pub irrep: String,
    pub spin: Spin,
}

impl Orbital {
    pub fn new(number: u32, irrep: impl Into<String>, spin: Spin) -> Self {
        Orbital {
            number,
            irrep: irrep.into(),
            spin,
        }
    }
}

/// 跃迁方向：激发 (->) 或退激发 (<-)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Excitation,
    Deexcitation,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Excitation => "->",
            Direction::Deexcitation => "<-",
        }
    }
}

/// 单个轨道对贡献
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoTransition {
    /// 给体轨道
    pub from: Orbital,
    /// 受体轨道
    pub to: Orbital,
    pub direction: Direction,
    /// CI 系数（程序只输出权重时为 0）
    pub ci_coeff: f64,
    /// 权重（0-1），未给出时由 CI 系数计算
    pub weight: Option<f64>,
}

impl MoTransition {
    pub fn new(from: Orbital, to: Orbital, direction: Direction, ci_coeff: f64) -> Self {
        MoTransition {
            from,
            to,
            direction,
            ci_coeff,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn weight_or_zero(&self) -> f64 {
        self.weight.unwrap_or(0.0)
    }
}

impl fmt::Display for MoTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\t{:>5}{} {} {} {:>5}{} {}\t{:>6.3}\t{:.1}%",
            self.from.number,
            self.from.irrep,
            self.from.spin.short(),
            self.direction.arrow(),
            self.to.number,
            self.to.irrep,
            self.to.spin.short(),
            self.ci_coeff,
            self.weight_or_zero() * 100.0
        )
    }
}

/// 激发态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcitedState {
    /// 程序输出中的编号
    pub id: usize,

    /// 按激发能升序的排名（1..N）
    pub rank: usize,

    /// 自旋多重度标签（singlet/triplet/...，开壳层时可能为空或 <S**2> 值）
    pub spin: String,

    /// 空间对称性（不可约表示）
    pub irrep: String,

    /// 激发能 (eV)
    pub energy_ev: f64,

    /// 振子强度
    pub osc: f64,

    /// <S**2>
    pub s2: Option<f64>,

    /// 共振拉曼权重
    pub rr_weight: Option<f64>,

    /// 轨道跃迁贡献
    pub transitions: Vec<MoTransition>,
}

impl ExcitedState {
    pub fn new(
        id: usize,
        spin: impl Into<String>,
        irrep: impl Into<String>,
        energy_ev: f64,
        osc: f64,
    ) -> Self {
        ExcitedState {
            id,
            rank: 0,
            spin: spin.into(),
            irrep: irrep.into(),
            energy_ev,
            osc,
            s2: None,
            rr_weight: None,
            transitions: Vec::new(),
        }
    }

    /// 激发波长 (nm)
    pub fn wavelength_nm(&self) -> f64 {
        units::ev_to_nm(self.energy_ev)
    }

    pub fn is_singlet(&self) -> bool {
        self.spin.eq_ignore_ascii_case("singlet")
    }

    /// 所有给体轨道编号
    pub fn start_mos(&self) -> BTreeSet<u32> {
        self.transitions.iter().map(|t| t.from.number).collect()
    }

    /// 所有受体轨道编号
    pub fn final_mos(&self) -> BTreeSet<u32> {
        self.transitions.iter().map(|t| t.to.number).collect()
    }

    pub fn has_transition(&self, start_mo: u32, final_mo: u32) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from.number == start_mo && t.to.number == final_mo)
    }

    /// 按不可约表示分组的参与轨道编号
    pub fn mos_per_irrep(&self) -> BTreeMap<String, Vec<u32>> {
        let mut map: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for t in &self.transitions {
            map.entry(t.from.irrep.clone()).or_default().push(t.from.number);
            map.entry(t.to.irrep.clone()).or_default().push(t.to.number);
        }
        map
    }

    /// 整理轨道贡献
    ///
    /// 1. 未给出权重的项由 CI 系数计算（c²，闭壳层单重态乘 2）
    /// 2. 退激发权重从对应的激发项中扣除，然后移除退激发项
    /// 3. 移除权重 ≤ 2·t² 的项（t 为 CI 系数阈值）
    pub fn finalize_contributions(&mut self, ci_threshold: f64) {
        let singlet = self.is_singlet();
        for t in &mut self.transitions {
            if t.weight.is_none() {
                let mut w = t.ci_coeff * t.ci_coeff;
                if singlet {
                    w *= 2.0;
                }
                t.weight = Some(w);
            }
        }

        let back: Vec<(u32, u32, f64)> = self
            .transitions
            .iter()
            .filter(|t| t.direction == Direction::Deexcitation)
            // "44 <- 47" 对应激发项 "44 -> 47"
            .map(|t| (t.from.number, t.to.number, t.weight_or_zero()))
            .collect();
        for (start, end, w) in back {
            if let Some(forward) = self.transitions.iter_mut().find(|t| {
                t.direction == Direction::Excitation && t.from.number == start && t.to.number == end
            }) {
                forward.weight = Some(forward.weight_or_zero() - w);
            }
        }
        self.transitions
            .retain(|t| t.direction == Direction::Excitation);

        let weight_threshold = 2.0 * ci_threshold * ci_threshold;
        self.transitions
            .retain(|t| t.weight_or_zero() > weight_threshold);
    }

    /// 计算共振拉曼权重，`excitation_nm` 为激发光波长
    pub fn calc_rr_weight(&mut self, excitation_nm: f64) {
        // 阻尼因子 Γ = 1500 cm⁻¹
        const GAMMA: f64 = 1500.0;
        let delta = units::nm_to_wavenumber(self.wavelength_nm())
            - units::nm_to_wavenumber(excitation_nm);
        self.rr_weight = Some(self.osc * GAMMA / (delta * delta + GAMMA * GAMMA).sqrt());
    }
}

/// 按激发能升序为激发态赋予排名（能量相同时保持原顺序）
pub fn assign_energy_ranks(states: &mut [ExcitedState]) {
    let mut order: Vec<usize> = (0..states.len()).collect();
    order.sort_by(|&a, &b| {
        states[a]
            .energy_ev
            .partial_cmp(&states[b].energy_ev)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (rank, idx) in order.into_iter().enumerate() {
        states[idx].rank = rank + 1;
    }
}
