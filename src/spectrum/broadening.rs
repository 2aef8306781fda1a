//! # 高斯展宽
//!
//! 线型取自 Gaussian 公司白皮书 "UV/Visible Spectra"，σ = 0.4 eV（3099.6 nm）：
//!
//! ```text
//! ε(λ) = 1.3062974e8 · f / (1e7/3099.6) · exp(-((1/λ − 1/λᵢ)/(1/3099.6))²)
//! ε(E) = 1.3062974e8 · f / (1e7/3099.6) · exp(-((E − Eᵢ)/0.4)²)
//! ```
//!
//! ## 依赖关系
//! - 被 `spectrum/export.rs`, `spectrum/plot.rs`, `commands/spectrum.rs` 使用
//! - 使用 `models/units.rs`

use crate::error::{Result, TdError};
use crate::models::units::nm_to_ev;
use crate::models::ExcitedState;

/// 摩尔吸光系数前因子
const PREFACTOR: f64 = 1.3062974e8;

/// 展宽宽度 σ (nm 表示，对应 0.4 eV)
const SIGMA_NM: f64 = 3099.6;

/// 展宽宽度 σ (eV)
const SIGMA_EV: f64 = 0.4;

/// ε → f 的换算因子
const E2F_FACTOR: f64 = 40490.05867167;

/// 波长网格步长 (nm)
pub const NM_STEP: f64 = 0.5;

/// 能量网格步长 (eV)
pub const EV_STEP: f64 = 0.01;

/// 光谱参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumConfig {
    /// 起始波长 (nm)
    pub from_nm: f64,
    /// 终止波长 (nm，不含)
    pub to_nm: f64,
    /// 将每条曲线归一化到最大值 1
    pub normalize: bool,
    /// 将 ε 换算为振子强度标度
    pub e2f: bool,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        SpectrumConfig {
            from_nm: 200.0,
            to_nm: 600.0,
            normalize: true,
            e2f: false,
        }
    }
}

impl SpectrumConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.from_nm > 0.0 && self.from_nm < self.to_nm) {
            return Err(TdError::InvalidRange(format!(
                "{}-{} nm (need 0 < from < to)",
                self.from_nm, self.to_nm
            )));
        }
        Ok(())
    }
}

/// 展宽后的光谱
#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    /// 波长曲线 (nm, ε)
    pub nm_curve: Vec<(f64, f64)>,
    /// 波长脉冲 (λᵢ, fᵢ)
    pub nm_impulses: Vec<(f64, f64)>,
    /// 能量曲线 (eV, ε)
    pub ev_curve: Vec<(f64, f64)>,
    /// 能量脉冲 (Eᵢ, fᵢ)
    pub ev_impulses: Vec<(f64, f64)>,
}

impl Spectrum {
    /// 由激发态生成光谱
    pub fn generate(states: &[ExcitedState], config: &SpectrumConfig) -> Result<Self> {
        config.validate()?;

        let nm_lines: Vec<(f64, f64)> = states.iter().map(|s| (s.wavelength_nm(), s.osc)).collect();
        let ev_lines: Vec<(f64, f64)> = states.iter().map(|s| (s.energy_ev, s.osc)).collect();

        let nm_grid = make_grid(config.from_nm, config.to_nm, NM_STEP);
        let ev_grid = make_grid(nm_to_ev(config.to_nm), nm_to_ev(config.from_nm), EV_STEP);

        let mut nm_curve = apply_broadening(&nm_lines, &nm_grid, gauss_band_nm);
        let mut ev_curve = apply_broadening(&ev_lines, &ev_grid, gauss_band_ev);

        for curve in [&mut nm_curve, &mut ev_curve] {
            if config.e2f {
                curve.iter_mut().for_each(|(_, y)| *y /= E2F_FACTOR);
            }
            if config.normalize {
                normalize(curve);
            }
        }

        Ok(Spectrum {
            nm_curve,
            nm_impulses: nm_lines,
            ev_curve,
            ev_impulses: ev_lines,
        })
    }

    /// 波长曲线的最大值位置 (nm, ε)
    pub fn nm_maximum(&self) -> Option<(f64, f64)> {
        self.nm_curve
            .iter()
            .copied()
            .fold(None, |best, p| match best {
                Some((_, y)) if y >= p.1 => best,
                _ => Some(p),
            })
    }
}

/// 单条谱带在波长 `l` 处的贡献
pub fn gauss_band_nm(l: f64, f: f64, l_i: f64) -> f64 {
    PREFACTOR * f / (1e7 / SIGMA_NM) * (-((1.0 / l - 1.0 / l_i) / (1.0 / SIGMA_NM)).powi(2)).exp()
}

/// 单条谱带在能量 `e` 处的贡献
pub fn gauss_band_ev(e: f64, f: f64, e_i: f64) -> f64 {
    PREFACTOR * f / (1e7 / SIGMA_NM) * (-((e - e_i) / SIGMA_EV).powi(2)).exp()
}

/// 等间距网格 [start, end)
fn make_grid(start: f64, end: f64, step: f64) -> Vec<f64> {
    let n_points = ((end - start) / step).ceil().max(0.0) as usize;
    (0..n_points).map(|i| start + i as f64 * step).collect()
}

/// 将谱线 (位置, 强度) 叠加到网格上
fn apply_broadening(
    lines: &[(f64, f64)],
    grid: &[f64],
    band: fn(f64, f64, f64) -> f64,
) -> Vec<(f64, f64)> {
    let mut pattern: Vec<(f64, f64)> = grid.iter().map(|&x| (x, 0.0)).collect();

    for &(position, f) in lines {
        if f == 0.0 {
            continue;
        }
        for (x, y) in pattern.iter_mut() {
            *y += band(*x, f, position);
        }
    }

    pattern
}

/// 归一化到最大值 1（全为 0 时保持不变）
fn normalize(curve: &mut [(f64, f64)]) {
    let max = curve.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max);
    if max > 0.0 {
        curve.iter_mut().for_each(|(_, y)| *y /= max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::units::EV2NM;
    use approx::assert_relative_eq;

    fn state_at(nm: f64, f: f64) -> ExcitedState {
        ExcitedState::new(1, "singlet", "A", nm_to_ev(nm), f)
    }

    #[test]
    fn test_single_band_peak_position() {
        let config = SpectrumConfig {
            from_nm: 200.0,
            to_nm: 400.0,
            normalize: false,
            e2f: false,
        };
        let spectrum = Spectrum::generate(&[state_at(300.0, 0.5)], &config).unwrap();
        let (x, y) = spectrum.nm_maximum().unwrap();
        assert!((x - 300.0).abs() <= 0.5);
        assert_relative_eq!(y, PREFACTOR * 0.5 / (1e7 / SIGMA_NM), max_relative = 1e-6);

        // 振幅与 f 成正比
        let doubled = Spectrum::generate(&[state_at(300.0, 1.0)], &config).unwrap();
        let (_, y2) = doubled.nm_maximum().unwrap();
        assert_relative_eq!(y2, 2.0 * y, max_relative = 1e-9);
    }

    #[test]
    fn test_normalized_maximum_is_one() {
        let states = vec![state_at(250.0, 0.3), state_at(320.0, 0.9)];
        let spectrum = Spectrum::generate(&states, &SpectrumConfig::default()).unwrap();
        let max_nm = spectrum.nm_curve.iter().map(|p| p.1).fold(0.0, f64::max);
        let max_ev = spectrum.ev_curve.iter().map(|p| p.1).fold(0.0, f64::max);
        assert_relative_eq!(max_nm, 1.0);
        assert_relative_eq!(max_ev, 1.0);
    }

    #[test]
    fn test_all_zero_strengths_stay_zero() {
        let states = vec![state_at(300.0, 0.0)];
        let spectrum = Spectrum::generate(&states, &SpectrumConfig::default()).unwrap();
        assert!(spectrum.nm_curve.iter().all(|(_, y)| *y == 0.0));
    }

    #[test]
    fn test_grids() {
        let spectrum = Spectrum::generate(&[], &SpectrumConfig::default()).unwrap();
        assert_eq!(spectrum.nm_curve.len(), 800);
        assert_relative_eq!(spectrum.nm_curve[0].0, 200.0);
        assert_relative_eq!(spectrum.nm_curve[799].0, 599.5);
        assert!(spectrum.nm_curve.windows(2).all(|w| w[0].0 < w[1].0));

        let first_ev = spectrum.ev_curve[0].0;
        assert_relative_eq!(first_ev, EV2NM / 600.0);
        assert!(spectrum.ev_curve.last().unwrap().0 < EV2NM / 200.0);
        assert!(spectrum.ev_curve.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_e2f_scaling() {
        let config = SpectrumConfig {
            normalize: false,
            e2f: true,
            ..Default::default()
        };
        let plain = SpectrumConfig {
            normalize: false,
            ..Default::default()
        };
        let states = [state_at(300.0, 0.5)];
        let a = Spectrum::generate(&states, &config).unwrap();
        let b = Spectrum::generate(&states, &plain).unwrap();
        assert_relative_eq!(
            a.nm_maximum().unwrap().1 * E2F_FACTOR,
            b.nm_maximum().unwrap().1,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_invalid_range() {
        let config = SpectrumConfig {
            from_nm: 400.0,
            to_nm: 300.0,
            ..Default::default()
        };
        assert!(matches!(
            Spectrum::generate(&[], &config),
            Err(TdError::InvalidRange(_))
        ));
    }
}
