//! # UV-Vis 光谱模块
//!
//! 将激发态的振子强度用高斯线型展宽为连续吸收光谱。
//!
//! ## 子模块
//! - `broadening`: 波长 (nm) 与能量 (eV) 网格上的高斯展宽
//! - `peaks`: 基于前瞻窗口的极值检测
//! - `export`: gnuplot 兼容的数据块输出
//! - `plot`: `plotters` 绘图 (PNG/SVG)
//!
//! ## 依赖关系
//! - 被 `commands/spectrum.rs` 使用
//! - 使用 `models/excited_state.rs`

pub mod broadening;
pub mod export;
pub mod peaks;
pub mod plot;

pub use broadening::{Spectrum, SpectrumConfig};
