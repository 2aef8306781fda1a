//! # 文本表格输出
//!
//! ## 支持格式
//! - pretty: `tabled` 终端表格，可分组 (`### Chunk i ###`)
//! - raw: 制表符分隔，无表头
//! - booktabs: LaTeX `booktabs` 表格
//! - tiddly: TiddlyWiki 表格
//! - summary: 每个激发态一张单行表格 + 轨道跃迁明细
//!
//! 所有函数返回字符串，由 `commands/show.rs` 打印到 stdout。
//!
//! ## 依赖关系
//! - 被 `commands/show.rs` 调用
//! - 使用 `export/table.rs`, `filter.rs`
//! - 使用 `tabled` 渲染表格

use crate::export::table::{self, HEADER};
use crate::filter;
use crate::models::ExcitedState;
use crate::parsers::OrbitalLabels;

use std::collections::BTreeMap;
use tabled::{Table, Tabled};

/// 终端表格行
#[derive(Debug, Clone, Tabled)]
struct StateRow {
    #[tabled(rename = "#")]
    id: usize,
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "2S+1")]
    spin: String,
    #[tabled(rename = "Spat.")]
    irrep: String,
    #[tabled(rename = "dE / eV")]
    energy: String,
    #[tabled(rename = "λ / nm")]
    wavelength: String,
    #[tabled(rename = "f")]
    osc: String,
    #[tabled(rename = "<S**2>")]
    s2: String,
}

impl From<&ExcitedState> for StateRow {
    fn from(es: &ExcitedState) -> Self {
        StateRow {
            id: es.id,
            rank: es.rank,
            spin: es.spin.clone(),
            irrep: es.irrep.clone(),
            energy: format!("{:.2}", es.energy_ev),
            wavelength: format!("{:.1}", es.wavelength_nm()),
            osc: format!("{:.5}", es.osc),
            s2: es.s2.map(|s| format!("{:.3}", s)).unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// 共振拉曼权重行
#[derive(Debug, Clone, Tabled)]
struct RrRow {
    #[tabled(rename = "#")]
    id: usize,
    #[tabled(rename = "λ / nm")]
    wavelength: String,
    #[tabled(rename = "RR weight")]
    weight: String,
}

fn state_table(states: &[ExcitedState]) -> String {
    let rows: Vec<StateRow> = states.iter().map(StateRow::from).collect();
    Table::new(&rows).to_string()
}

/// 终端表格；`chunk_size > 0` 时分组输出
pub fn pretty(states: &[ExcitedState], chunk_size: usize) -> String {
    if chunk_size == 0 {
        return state_table(states);
    }

    let mut out = String::new();
    for (i, group) in filter::chunk(states, chunk_size).into_iter().enumerate() {
        out.push_str(&format!("### Chunk {} ###\n{}\n\n", i + 1, state_table(group)));
    }
    out
}

/// 制表符分隔的原始数据
pub fn raw(states: &[ExcitedState]) -> String {
    states
        .iter()
        .map(|es| {
            [
                es.id.to_string(),
                es.spin.clone(),
                es.irrep.clone(),
                es.energy_ev.to_string(),
                es.wavelength_nm().to_string(),
                es.osc.to_string(),
                es.s2.map(|s| s.to_string()).unwrap_or_default(),
            ]
            .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 转义 LaTeX 特殊字符
pub fn escape_latex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// LaTeX booktabs 表格（编号、对称性、能量、波长、振子强度）
pub fn booktabs(states: &[ExcitedState]) -> String {
    let mut out = String::new();
    out.push_str("\\begin{tabular}{rlrrr}\n\\toprule\n");
    out.push_str("  \\# & Spat. & dE / eV & $\\lambda$ / nm & f \\\\\n\\midrule\n");
    for es in states {
        out.push_str(&format!(
            "  {} & {} & {:.2} & {:.1} & {:.4} \\\\\n",
            es.id,
            escape_latex(&es.irrep),
            es.energy_ev,
            es.wavelength_nm(),
            es.osc
        ));
    }
    out.push_str("\\bottomrule\n\\end{tabular}");
    out
}

/// TiddlyWiki 表格
pub fn tiddly(states: &[ExcitedState], labels: &OrbitalLabels) -> String {
    let escape = |s: &str| s.replace('|', "&#124;");
    let mut lines = vec![format!("|! {} |", HEADER.join(" |! "))];
    for row in table::format_rows(states, labels, "<br>") {
        let cells: Vec<String> = row.cells().iter().map(|c| escape(*c)).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines.join("\n")
}

/// 每个激发态的单行表格与轨道跃迁
pub fn summary(states: &[ExcitedState], labels: &OrbitalLabels) -> String {
    let mut out = String::new();
    for es in states {
        out.push_str(&state_table(std::slice::from_ref(es)));
        out.push('\n');
        out.push_str(&transitions(es, labels));
        out.push('\n');
    }
    out
}

/// 单个激发态的轨道跃迁明细（有名称时追加一行）
pub fn transitions(es: &ExcitedState, labels: &OrbitalLabels) -> String {
    let mut out = String::new();
    for t in &es.transitions {
        out.push_str(&format!("{}\n", t));
        if let (Some(from), Some(to)) = (labels.get_orbital(&t.from), labels.get_orbital(&t.to)) {
            out.push_str(&format!("\t\t{} -> {}\n", from, to));
        }
    }
    out
}

/// 共振拉曼权重表，只列出不低于阈值的激发态
pub fn rr_table(states: &[ExcitedState], threshold: f64) -> Option<String> {
    let rows: Vec<RrRow> = states
        .iter()
        .filter_map(|es| {
            es.rr_weight.filter(|w| *w >= threshold).map(|w| RrRow {
                id: es.id,
                wavelength: format!("{:.1}", es.wavelength_nm()),
                weight: format!("{:.4}", w),
            })
        })
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(Table::new(&rows).to_string())
    }
}

/// 每个不可约表示中涉及的最低/最高轨道
pub fn mo_ranges(states: &[ExcitedState]) -> BTreeMap<String, (u32, u32)> {
    let mut ranges: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for es in states {
        for (irrep, mos) in es.mos_per_irrep() {
            for mo in mos {
                let entry = ranges.entry(irrep.clone()).or_insert((mo, mo));
                entry.0 = entry.0.min(mo);
                entry.1 = entry.1.max(mo);
            }
        }
    }
    ranges
}

/// 表格后的脚注
pub fn footer(states: &[ExcitedState], ci_threshold: f64) -> String {
    let mut out = format!(
        "Only considering transitions with CI-coefficients >= {}:",
        ci_threshold
    );
    for (irrep, (min_mo, max_mo)) in mo_ranges(states) {
        out.push_str(&format!("\nIrrep {}: MOs {} - {}", irrep, min_mo, max_mo));
    }
    out
}
