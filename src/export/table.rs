//! # 通用行格式化
//!
//! docx / tiddly / html 导出共用的单元格格式：
//! `S{id}`，λ 一位小数，E 两位小数，f 四位小数，
//! 跃迁 `名称 (45 a) → 名称 (46 a)`，权重 `{:.0}%`，多条跃迁用给定换行符连接。
//!
//! ## 依赖关系
//! - 被 `export/` 各子模块使用
//! - 使用 `parsers/mo_labels.rs` 的 OrbitalLabels

use crate::models::{ExcitedState, Orbital};
use crate::parsers::OrbitalLabels;

/// 表头
pub const HEADER: [&str; 6] = ["State", "λ / nm", "E / eV", "f", "Transition", "Weight"];

/// 格式化后的一行
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedRow {
    pub state: String,
    pub wavelength: String,
    pub energy: String,
    pub osc: String,
    pub transitions: String,
    pub weights: String,
}

impl FormattedRow {
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.state,
            &self.wavelength,
            &self.energy,
            &self.osc,
            &self.transitions,
            &self.weights,
        ]
    }
}

/// 轨道显示名称：`名称 (45 a)`，无名称时为 `(45 a)`
pub fn orbital_label(orbital: &Orbital, labels: &OrbitalLabels) -> String {
    match labels.get_orbital(orbital) {
        Some(name) => format!("{} ({} {})", name, orbital.number, orbital.irrep),
        None => format!("({} {})", orbital.number, orbital.irrep),
    }
}

/// 格式化所有激发态
pub fn format_rows(states: &[ExcitedState], labels: &OrbitalLabels, newline: &str) -> Vec<FormattedRow> {
    states
        .iter()
        .map(|es| {
            let transitions: Vec<String> = es
                .transitions
                .iter()
                .map(|t| {
                    format!(
                        "{} → {}",
                        orbital_label(&t.from, labels),
                        orbital_label(&t.to, labels)
                    )
                })
                .collect();
            let weights: Vec<String> = es
                .transitions
                .iter()
                .map(|t| format!("{:.0}%", t.weight_or_zero() * 100.0))
                .collect();

            FormattedRow {
                state: format!("S{}", es.id),
                wavelength: format!("{:.1}", es.wavelength_nm()),
                energy: format!("{:.2}", es.energy_ev),
                osc: format!("{:.4}", es.osc),
                transitions: transitions.join(newline),
                weights: weights.join(newline),
            }
        })
        .collect()
}
