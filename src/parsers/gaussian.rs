//! # Gaussian TD-DFT 输出解析器
//!
//! ## 格式说明
//! ```text
//!  Excited State   1:      Singlet-A      4.5000 eV  275.52 nm  f=0.1000  <S**2>=0.000
//!       45 -> 46         0.70000
//!       44 <- 47        -0.10000
//!  This state for optimization and/or second-order correction.
//!
//! ```
//! 开壳层计算中轨道编号带 `A`/`B` 后缀（alpha/beta），自旋标签为 `<S**2>` 数值。
//! 空行结束一个激发态块。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/excited_state.rs`

use crate::error::{Result, TdError};
use crate::models::{Direction, ExcitedState, MoTransition, Orbital, Spin};
use crate::parsers::{compile, parse_float};

const FORMAT: &str = "Gaussian";

/// Gaussian 不输出轨道对称性
const DEFAULT_IRREP: &str = "A";

const HEADER_PATTERN: &str = r#"^\s*Excited State\s+(\d+):\s+([\w.]+)-([?\w'"]+)\s+(\S+)\s+eV\s+(\S+)\s+nm\s+f=\s*(\S+?)(?:\s+<S\*\*2>=\s*(\S+))?\s*$"#;
const TRANSITION_PATTERN: &str = r"^\s*(\d+)([AB]?)\s*(->|<-)\s*(\d+)([AB]?)\s+(-?[\d.]+)";

/// 文本中是否存在 Gaussian 激发态行
pub fn has_excited_state_line(text: &str) -> bool {
    text.lines()
        .any(|l| l.trim_start().starts_with("Excited State") && l.contains(" eV ") && l.contains("f="))
}

/// 解析 Gaussian TD 输出，按出现顺序返回每个激发态块的解析结果
pub fn parse_tddft(text: &str) -> Result<Vec<Result<ExcitedState>>> {
    let header_re = compile(HEADER_PATTERN)?;
    let trans_re = compile(TRANSITION_PATTERN)?;

    let mut blocks: Vec<Result<ExcitedState>> = Vec::new();
    let mut in_block = false;

    for line in text.lines() {
        if line.trim_start().starts_with("Excited State") {
            in_block = true;
            blocks.push(match header_re.captures(line) {
                Some(caps) => parse_header(&caps),
                None => Err(TdError::malformed(FORMAT, "?", format!("unreadable header '{}'", line.trim()))),
            });
            continue;
        }

        if !in_block {
            continue;
        }
        // 空行结束当前块
        if line.trim().is_empty() {
            in_block = false;
            continue;
        }

        if let Some(caps) = trans_re.captures(line) {
            let Some(last) = blocks.last_mut() else {
                continue;
            };
            if let Ok(state) = last {
                let Some(ci) = parse_float(&caps[6]) else {
                    let id = state.id;
                    *last = Err(TdError::malformed(
                        FORMAT,
                        id,
                        format!("invalid CI coefficient '{}'", &caps[6]),
                    ));
                    continue;
                };
                let direction = if &caps[3] == "<-" {
                    Direction::Deexcitation
                } else {
                    Direction::Excitation
                };
                let from = parse_orbital(&caps[1], &caps[2]);
                let to = parse_orbital(&caps[4], &caps[5]);
                if let (Some(from), Some(to)) = (from, to) {
                    state.transitions.push(MoTransition::new(from, to, direction, ci));
                }
            }
        }
    }

    Ok(blocks)
}

/// 解析激发态标题行
fn parse_header(caps: &regex::Captures) -> Result<ExcitedState> {
    let id: usize = caps[1]
        .parse()
        .map_err(|_| TdError::malformed(FORMAT, &caps[1], "invalid state number"))?;

    let energy = parse_float(&caps[4])
        .ok_or_else(|| TdError::malformed(FORMAT, id, format!("invalid energy '{}'", &caps[4])))?;
    let osc = parse_float(&caps[6]).ok_or_else(|| {
        TdError::malformed(FORMAT, id, format!("invalid oscillator strength '{}'", &caps[6]))
    })?;
    if osc < 0.0 {
        return Err(TdError::malformed(FORMAT, id, "negative oscillator strength"));
    }

    let mut state = ExcitedState::new(id, caps[2].to_lowercase(), &caps[3], energy, osc);
    state.s2 = caps.get(7).and_then(|m| parse_float(m.as_str()));
    Ok(state)
}

fn parse_orbital(number: &str, suffix: &str) -> Option<Orbital> {
    let number = number.parse().ok()?;
    Some(Orbital::new(number, DEFAULT_IRREP, Spin::from_label(suffix)))
}
