//! # ORCA TD-DFT/TDA 输出解析器
//!
//! ## 格式说明
//! ```text
//! TD-DFT/TDA EXCITED STATES (SINGLETS)
//!
//! STATE  1:  E=   0.165377 au      4.500 eV    36296.5 cm**-1 <S**2> =   0.000000
//!     45a ->  46a  :     0.980000 (c= -0.98994949)
//!
//!          ABSORPTION SPECTRUM VIA TRANSITION ELECTRIC DIPOLE MOMENTS
//! State   Energy    Wavelength  fosc         T2        TX        TY        TZ
//!    1   36296.5    275.5   0.100000000   0.90696   0.95233   0.00000   0.00000
//! ```
//! ORCA 6 的吸收光谱表行形如 `0-1A  ->  1-1A    4.500000   36296.5   275.5   0.100000000 ...`。
//! 轨道后缀 `a`/`b` 表示 alpha/beta 自旋，权重直接取输出值。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/excited_state.rs`

use crate::error::{Result, TdError};
use crate::models::{Direction, ExcitedState, MoTransition, Orbital, Spin};
use crate::parsers::{compile, multiplicity_name, multiplicity_number, osc_may_be_absent, parse_float};

use std::collections::HashMap;

const FORMAT: &str = "ORCA";

/// 无对称性时的空间标签
const DEFAULT_IRREP: &str = "A";

const SECTION_PATTERN: &str = r"EXCITED STATES(?:\s*\((SINGLETS|TRIPLETS)\))?";
const STATE_PATTERN: &str = r"^\s*STATE\s+(\d+):\s+E=\s*(\S+)\s+au\s+(\S+)\s+eV(?:.*<S\*\*2>\s*=\s*(\S+))?(?:.*Mult\s+(\d+))?";
const TRANSITION_PATTERN: &str =
    r"^\s*(\d+)([ab])\s*(->|<-)\s*(\d+)([ab])\s*:\s*(-?[\d.]+)(?:\s*\(c=\s*(-?[\d.]+)\))?";
const ABSORPTION_MARKER: &str = "ABSORPTION SPECTRUM VIA TRANSITION ELECTRIC DIPOLE MOMENTS";
const ROW_PATTERN: &str = r"^\s*(\d+)\s+(-?[\d.]+)\s+(-?[\d.]+)\s+(-?[\d.]+(?:[eE][+-]?\d+)?)\s";
const ROW6_PATTERN: &str = r"^\s*\d+-\w+\s+->\s+(\d+)-(\w+)\s+(-?[\d.]+)\s+(-?[\d.]+)\s+(-?[\d.]+)\s+(-?[\d.]+(?:[eE][+-]?\d+)?)";

/// 解析 ORCA TD-DFT 输出
pub fn parse_tddft(text: &str) -> Result<Vec<Result<ExcitedState>>> {
    let section_re = compile(SECTION_PATTERN)?;
    let state_re = compile(STATE_PATTERN)?;
    let trans_re = compile(TRANSITION_PATTERN)?;

    let oscillator_strengths = parse_absorption_table(text)?;

    let mut blocks: Vec<Result<ExcitedState>> = Vec::new();
    let mut section_spin = String::new();
    let mut in_state = false;

    for line in text.lines() {
        if let Some(caps) = section_re.captures(line) {
            section_spin = caps
                .get(1)
                .map(|m| m.as_str().trim_end_matches('S').to_lowercase())
                .unwrap_or_default();
            in_state = false;
            continue;
        }

        if let Some(caps) = state_re.captures(line) {
            in_state = true;
            blocks.push(parse_state(&caps, &section_spin, &oscillator_strengths));
            continue;
        }

        if !in_state || line.trim().is_empty() {
            continue;
        }

        match trans_re.captures(line) {
            Some(caps) => {
                let Some(last) = blocks.last_mut() else {
                    continue;
                };
                if let Ok(state) = last {
                    let (Ok(from), Ok(to)) = (caps[1].parse::<u32>(), caps[4].parse::<u32>()) else {
                        continue;
                    };
                    // 未给出 c= 时 CI 系数记为 0，权重直接取输出值
                    let numbers = (
                        parse_float(&caps[6]),
                        caps.get(7).map_or(Some(0.0), |m| parse_float(m.as_str())),
                    );
                    let (Some(weight), Some(ci)) = numbers else {
                        let id = state.id;
                        *last = Err(TdError::malformed(
                            FORMAT,
                            id,
                            format!("unreadable contribution '{}'", line.trim()),
                        ));
                        continue;
                    };
                    let direction = if &caps[3] == "<-" {
                        Direction::Deexcitation
                    } else {
                        Direction::Excitation
                    };
                    state.transitions.push(
                        MoTransition::new(
                            Orbital::new(from, DEFAULT_IRREP, Spin::from_label(&caps[2])),
                            Orbital::new(to, DEFAULT_IRREP, Spin::from_label(&caps[5])),
                            direction,
                            ci,
                        )
                        .with_weight(weight),
                    );
                }
            }
            None => in_state = false,
        }
    }

    Ok(blocks)
}

/// 解析 STATE 行
fn parse_state(
    caps: &regex::Captures,
    section_spin: &str,
    oscillator_strengths: &AbsorptionTable,
) -> Result<ExcitedState> {
    let id: usize = caps[1]
        .parse()
        .map_err(|_| TdError::malformed(FORMAT, &caps[1], "invalid state number"))?;
    let energy = parse_float(&caps[3])
        .ok_or_else(|| TdError::malformed(FORMAT, id, format!("invalid energy '{}'", &caps[3])))?;

    let spin = match caps.get(5).and_then(|m| m.as_str().parse::<u32>().ok()) {
        Some(mult) => multiplicity_name(mult).to_string(),
        None => section_spin.to_string(),
    };

    let osc = match lookup_osc(oscillator_strengths, id, &spin) {
        Some(f) => f,
        None if osc_may_be_absent(&spin) => 0.0,
        None => {
            return Err(TdError::malformed(
                FORMAT,
                id,
                "no oscillator strength in absorption spectrum table",
            ))
        }
    };
    if osc < 0.0 {
        return Err(TdError::malformed(FORMAT, id, "negative oscillator strength"));
    }

    let mut state = ExcitedState::new(id, spin, DEFAULT_IRREP, energy, osc);
    state.s2 = caps.get(4).and_then(|m| parse_float(m.as_str()));
    Ok(state)
}

/// (态编号, 多重度) -> 振子强度；旧版表格不标注多重度
type AbsorptionTable = HashMap<(usize, Option<u32>), f64>;

/// 查找激发态的振子强度
///
/// 旧版表格只包含单重态（或未标注多重度的开壳层态），三重态不会匹配旧版行。
fn lookup_osc(table: &AbsorptionTable, id: usize, spin: &str) -> Option<f64> {
    let found = match multiplicity_number(spin) {
        Some(1) => table.get(&(id, Some(1))).or_else(|| table.get(&(id, None))),
        Some(mult) => table.get(&(id, Some(mult))),
        None => table.get(&(id, None)).or_else(|| table.get(&(id, Some(1)))),
    };
    found.copied()
}

/// 读取第一个电偶极吸收光谱表
fn parse_absorption_table(text: &str) -> Result<AbsorptionTable> {
    let row_re = compile(ROW_PATTERN)?;
    let row6_re = compile(ROW6_PATTERN)?;

    let mut table = HashMap::new();
    let Some(start) = text.find(ABSORPTION_MARKER) else {
        return Ok(table);
    };

    let mut seen_rows = false;
    for line in text[start..].lines().skip(1) {
        if let Some(caps) = row6_re.captures(line) {
            // `1-3A`：态编号 1，多重度 3，对称性 A
            let mult: String = caps[2].chars().take_while(|c| c.is_ascii_digit()).collect();
            if let (Ok(id), Some(f)) = (caps[1].parse::<usize>(), parse_float(&caps[6])) {
                table.insert((id, mult.parse::<u32>().ok()), f);
                seen_rows = true;
            }
        } else if let Some(caps) = row_re.captures(line) {
            if let (Ok(id), Some(f)) = (caps[1].parse::<usize>(), parse_float(&caps[4])) {
                table.insert((id, None), f);
                seen_rows = true;
            }
        } else if seen_rows && (line.trim().is_empty() || line.trim_start().starts_with('-')) {
            break;
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: &str = r#"
                                 *****************
                                 * O   R   C   A *
                                 *****************

-------------------------
TD-DFT/TDA EXCITED STATES (SINGLETS)
-------------------------

the weight of the individual excitations are printed if larger than 1.0e-02

STATE  1:  E=   0.165377 au      4.500 eV    36296.5 cm**-1 <S**2> =   0.000000
    45a ->  46a  :     0.980000 (c= -0.98994949)
    44a ->  46a  :     0.015000 (c=  0.12247449)

STATE  2:  E=   0.183749 au      5.000 eV    40329.4 cm**-1 <S**2> =   0.000000
    44a ->  46a  :     0.900000 (c=  0.94868330)

-------------------------
TD-DFT/TDA EXCITED STATES (TRIPLETS)
-------------------------

STATE  1:  E=   0.110251 au      3.000 eV    24197.6 cm**-1
    45a ->  46a  :     0.990000 (c= -0.99498744)

-----------------------------------------------------------------------------
         ABSORPTION SPECTRUM VIA TRANSITION ELECTRIC DIPOLE MOMENTS
-----------------------------------------------------------------------------
State   Energy    Wavelength  fosc         T2        TX        TY        TZ
        (cm-1)      (nm)                 (au**2)    (au)      (au)      (au)
-----------------------------------------------------------------------------
   1   36296.5    275.5   0.100000000   0.90696   0.95233   0.00000   0.00000
   2   40329.4    248.0   0.800000000   6.53000   2.55538   0.00000   0.00000

-----------------------------------------------------------------------------
         ABSORPTION SPECTRUM VIA TRANSITION VELOCITY DIPOLE MOMENTS
-----------------------------------------------------------------------------
"#;

    #[test]
    fn test_parse_orca_singlets_and_triplets() {
        let states: Vec<ExcitedState> = parse_tddft(SAMPLE)
            .unwrap()
            .into_iter()
            .map(|b| b.unwrap())
            .collect();
        assert_eq!(states.len(), 3);

        assert_eq!(states[0].spin, "singlet");
        assert_relative_eq!(states[0].energy_ev, 4.5);
        assert_relative_eq!(states[0].osc, 0.1);
        assert_eq!(states[0].transitions.len(), 2);
        assert_relative_eq!(states[0].transitions[0].weight.unwrap(), 0.98);
        assert_relative_eq!(states[0].transitions[0].ci_coeff, -0.98994949);

        assert_relative_eq!(states[1].osc, 0.8);

        assert_eq!(states[2].spin, "triplet");
        assert_eq!(states[2].osc, 0.0);
    }

    #[test]
    fn test_orca6_absorption_rows() {
        let text = r#"
TD-DFT EXCITED STATES (SINGLETS)

STATE  1:  E=   0.165377 au      4.500 eV    36296.5 cm**-1 <S**2> =   0.000000 Mult 1
    45a ->  46a  :     0.980000 (c= -0.98994949)

         ABSORPTION SPECTRUM VIA TRANSITION ELECTRIC DIPOLE MOMENTS
     Transition      Energy     Energy  Wavelength fosc(D2)      D2        DX        DY        DZ
                      (eV)      (cm-1)    (nm)                 (au**2)    (au)      (au)      (au)
  0-1A  ->  1-1A    4.500000   36296.5   275.5   0.250000000   0.90696   0.95233   0.00000   0.00000
"#;
        let state = parse_tddft(text).unwrap().into_iter().next().unwrap().unwrap();
        assert_eq!(state.spin, "singlet");
        assert_relative_eq!(state.osc, 0.25);
    }

    #[test]
    fn test_orca6_rows_keep_multiplicities_apart() {
        let text = r#"
TD-DFT EXCITED STATES (SINGLETS)

STATE  1:  E=   0.165377 au      4.500 eV    36296.5 cm**-1 <S**2> =   0.000000 Mult 1
    45a ->  46a  :     0.980000 (c= -0.98994949)

TD-DFT EXCITED STATES (TRIPLETS)

STATE  1:  E=   0.110251 au      3.000 eV    24197.6 cm**-1 <S**2> =   2.000000 Mult 3
    45a ->  46a  :     0.990000 (c= -0.99498744)

         ABSORPTION SPECTRUM VIA TRANSITION ELECTRIC DIPOLE MOMENTS
     Transition      Energy     Energy  Wavelength fosc(D2)      D2        DX        DY        DZ
  0-1A  ->  1-3A    3.000000   24197.6   413.3   0.000500000   0.00700   0.08000   0.00000   0.00000
  0-1A  ->  1-1A    4.500000   36296.5   275.5   0.250000000   0.90696   0.95233   0.00000   0.00000
"#;
        let states: Vec<ExcitedState> = parse_tddft(text)
            .unwrap()
            .into_iter()
            .map(|b| b.unwrap())
            .collect();
        assert_eq!(states[0].spin, "singlet");
        assert_relative_eq!(states[0].osc, 0.25);
        assert_eq!(states[1].spin, "triplet");
        assert_relative_eq!(states[1].osc, 0.0005);
    }

    #[test]
    fn test_unreadable_weight_is_malformed() {
        let text = "TD-DFT/TDA EXCITED STATES (SINGLETS)\n\nSTATE  1:  E=   0.165377 au      4.500 eV    36296.5 cm**-1\n    45a ->  46a  :     0.98.0 (c= -0.98994949)\n\n\
         ABSORPTION SPECTRUM VIA TRANSITION ELECTRIC DIPOLE MOMENTS\n   1   36296.5    275.5   0.100000000   0.90696   0.95233   0.00000   0.00000\n";
        let blocks = parse_tddft(text).unwrap();
        assert!(matches!(blocks[0], Err(TdError::MalformedRecord { .. })));
    }

    #[test]
    fn test_missing_oscillator_strength_is_malformed() {
        let text = "TD-DFT/TDA EXCITED STATES (SINGLETS)\n\nSTATE  1:  E=   0.165377 au      4.500 eV    36296.5 cm**-1\n";
        let blocks = parse_tddft(text).unwrap();
        assert!(matches!(blocks[0], Err(TdError::MalformedRecord { .. })));
    }

    #[test]
    fn test_ranks_are_a_permutation() {
        let parsed = crate::parsers::parse_log_content(SAMPLE, crate::parsers::LogFormat::Orca, 0.2).unwrap();
        let mut ranks: Vec<usize> = parsed.states.iter().map(|s| s.rank).collect();
        // 单重态 4.5, 5.0 eV，三重态 3.0 eV
        assert_eq!(ranks, vec![2, 3, 1]);
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=parsed.states.len()).collect::<Vec<_>>());
    }
}
