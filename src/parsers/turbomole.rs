//! # TURBOMOLE escf / ricc2 输出解析器
//!
//! ## escf 格式说明
//! ```text
//!                                  1 singlet a excitation
//!  Excitation energy:                      0.1653770000000
//!  Oscillator strength:
//!     mixed representation:                0.1000000000000
//!  Dominant contributions:
//!       occ. orbital   energy / eV   virt. orbital     energy / eV   |coeff.|^2*100
//!        45 a              -6.12        46 a               -1.00        98.0
//!  Change of electron number for each symmetry:
//! ```
//! 开壳层计算中省略多重度，轨道后跟 `alpha`/`beta`。
//!
//! ## ricc2 格式说明
//! ```text
//!  | number, symmetry, multiplicity:  1 a    1                 |
//!  | frequency :   0.1653770  a.u.   4.5000000  e.V.  36295.9 rcm |
//!  | oscillator strength (length gauge)   :      0.1000000      |
//!  | occ. orb.  index spin | vir. orb.  index spin |  coeff/%    |
//!  |   45 a        45     |   46 a        46     |  -0.98995  98.0 |
//!  norm of printed elements:  0.98
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/excited_state.rs`, `models/units.rs`

use crate::error::{Result, TdError};
use crate::models::units::hartree_to_ev;
use crate::models::{Direction, ExcitedState, MoTransition, Orbital, Spin};
use crate::parsers::{compile, multiplicity_name, osc_may_be_absent, parse_float};

use regex::Regex;
use std::collections::HashSet;

const NUMBER: &str = r"-?[\d.]+(?:[EeDd][+-]?\d+)?";

// ─────────────────────────────────────────────────────────────
// escf
// ─────────────────────────────────────────────────────────────

const ESCF: &str = "TURBOMOLE escf";

/// 解析 escf 输出
pub fn parse_escf(text: &str) -> Result<Vec<Result<ExcitedState>>> {
    let header_re = compile(
        r#"(?m)^\s*(\d+)\s+(singlet|doublet|triplet|quartet|quintet|sextet)?\s*([\w'"]+)\s+excitation\s*$"#,
    )?;
    let energy_re = compile(&format!(r"Excitation energy:\s*({})", NUMBER))?;
    let osc_re = compile(&format!(r"mixed representation:\s*({})", NUMBER))?;
    let contrib_re = compile(
        r#"(\d+) ([\w'"]+)\s*(beta|alpha)?\s+(-?[\d.]+)\s+(\d+) ([\w'"]+)\s*(beta|alpha)?\s+(-?[\d.]+)\s+([\d.]+)"#,
    )?;

    let blocks = split_blocks(&header_re, text)
        .into_iter()
        .map(|(caps, body)| {
            let id: usize = caps[1]
                .parse()
                .map_err(|_| TdError::malformed(ESCF, &caps[1], "invalid state number"))?;
            let spin = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let irrep = &caps[3];

            let energy = energy_re
                .captures(body)
                .and_then(|c| parse_float(&c[1]))
                .ok_or_else(|| TdError::malformed(ESCF, id, "missing excitation energy"))?;

            let osc = match osc_re.captures(body).and_then(|c| parse_float(&c[1])) {
                Some(f) => f,
                None if osc_may_be_absent(spin) => 0.0,
                None => return Err(TdError::malformed(ESCF, id, "missing oscillator strength")),
            };
            if osc < 0.0 {
                return Err(TdError::malformed(ESCF, id, "negative oscillator strength"));
            }

            let mut state = ExcitedState::new(id, spin, irrep, hartree_to_ev(energy), osc);

            if let Some(table) = dominant_contributions(body) {
                for c in contrib_re.captures_iter(table) {
                    let (Ok(from), Ok(to), Ok(pct)) =
                        (c[1].parse::<u32>(), c[5].parse::<u32>(), c[9].parse::<f64>())
                    else {
                        continue;
                    };
                    let from_spin = c.get(3).map(|m| m.as_str()).unwrap_or_default();
                    let to_spin = c.get(7).map(|m| m.as_str()).unwrap_or_default();
                    state.transitions.push(
                        MoTransition::new(
                            Orbital::new(from, &c[2], Spin::from_label(from_spin)),
                            Orbital::new(to, &c[6], Spin::from_label(to_spin)),
                            Direction::Excitation,
                            0.0,
                        )
                        .with_weight(pct / 100.0),
                    );
                }
            }

            Ok(state)
        })
        .collect();

    Ok(blocks)
}

/// escf 中 `|coeff.|^2*100` 与 `Change of electron number` 之间的表格
fn dominant_contributions(body: &str) -> Option<&str> {
    let start = body.find("2*100")? + "2*100".len();
    let end = body[start..]
        .find("Change of electron number")
        .map(|e| start + e)
        .unwrap_or(body.len());
    Some(&body[start..end])
}

// ─────────────────────────────────────────────────────────────
// ricc2
// ─────────────────────────────────────────────────────────────

const RICC2: &str = "TURBOMOLE ricc2";

/// 解析 ricc2 输出
///
/// 请求激发态性质时，ricc2 会重复输出各激发态（不含振子强度），这些重复块被丢弃。
pub fn parse_ricc2(text: &str) -> Result<Vec<Result<ExcitedState>>> {
    let header_re = compile(r#"symmetry, multiplicity:\s*(\d+)\s*([\w"']+)\s*(\d+)"#)?;
    let energy_re = compile(r"frequency\s*:.+?(-?[\d.]+)\s*e\.V\.")?;
    let osc_re = compile(&format!(
        r"oscillator strength[^:\n]*length gauge\)\s*:\s*({})",
        NUMBER
    ))?;

    let mut seen: HashSet<(usize, String, u32)> = HashSet::new();
    let mut blocks = Vec::new();

    for (caps, body) in split_blocks(&header_re, text) {
        let id: usize = match caps[1].parse() {
            Ok(id) => id,
            Err(_) => {
                blocks.push(Err(TdError::malformed(RICC2, &caps[1], "invalid state number")));
                continue;
            }
        };
        let irrep = caps[2].to_string();
        let mult: u32 = caps[3].parse().unwrap_or(0);
        let spin = multiplicity_name(mult);

        let osc = osc_re.captures(body).and_then(|c| parse_float(&c[1]));
        let key = (id, irrep.clone(), mult);
        if osc.is_none() && seen.contains(&key) {
            continue;
        }
        seen.insert(key);

        blocks.push(parse_ricc2_block(id, spin, &irrep, body, osc, &energy_re));
    }

    Ok(blocks)
}

fn parse_ricc2_block(
    id: usize,
    spin: &str,
    irrep: &str,
    body: &str,
    osc: Option<f64>,
    energy_re: &Regex,
) -> Result<ExcitedState> {
    let energy = energy_re
        .captures(body)
        .and_then(|c| parse_float(&c[1]))
        .ok_or_else(|| TdError::malformed(RICC2, id, "missing excitation energy"))?;

    let osc = match osc {
        Some(f) => f,
        None if osc_may_be_absent(spin) => 0.0,
        None => return Err(TdError::malformed(RICC2, id, "missing oscillator strength")),
    };
    if osc < 0.0 {
        return Err(TdError::malformed(RICC2, id, "negative oscillator strength"));
    }

    let mut state = ExcitedState::new(id, spin, irrep, energy, osc);
    state.transitions = ricc2_contributions(body);
    Ok(state)
}

/// 解析 `occ. orb.` 表头与 `norm` 之间的轨道贡献行
fn ricc2_contributions(body: &str) -> Vec<MoTransition> {
    let mut transitions = Vec::new();
    let Some(start) = body.find("occ. orb.") else {
        return transitions;
    };

    for line in body[start..].lines().skip(1) {
        if line.contains("norm") {
            break;
        }
        let cleaned: String = line
            .chars()
            .map(|c| if matches!(c, '|' | '(' | ')') { ' ' } else { c })
            .collect();
        let mut fields: Vec<&str> = cleaned.split_whitespace().collect();
        // 闭壳层不输出自旋列
        if fields.len() == 8 {
            fields.insert(3, "a");
            fields.insert(7, "a");
        }
        if fields.len() != 10 {
            continue;
        }

        let (Ok(from), Ok(to), Some(ci), Some(pct)) = (
            fields[0].parse::<u32>(),
            fields[4].parse::<u32>(),
            parse_float(fields[8]),
            parse_float(fields[9]),
        ) else {
            continue;
        };

        transitions.push(
            MoTransition::new(
                Orbital::new(from, fields[1], Spin::from_label(fields[3])),
                Orbital::new(to, fields[5], Spin::from_label(fields[7])),
                Direction::Excitation,
                ci,
            )
            .with_weight(pct / 100.0),
        );
    }

    transitions
}

/// 以标题正则切分文本：返回 (标题捕获组, 到下一个标题为止的正文)
fn split_blocks<'t>(header_re: &Regex, text: &'t str) -> Vec<(regex::Captures<'t>, &'t str)> {
    let headers: Vec<regex::Captures<'t>> = header_re.captures_iter(text).collect();
    let starts: Vec<usize> = headers
        .iter()
        .map(|caps| caps.get(0).map_or(text.len(), |m| m.start()))
        .collect();

    headers
        .into_iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let body_start = caps.get(0)?.end();
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            Some((caps, &text[body_start..end]))
        })
        .collect()
}
