//! # 解析器模块
//!
//! 识别激发态计算输出的来源程序，并提取统一的激发态记录。
//!
//! ## 支持格式
//! - Gaussian TD-DFT/CIS (`Excited State   n:` 块)
//! - ORCA TD-DFT/TDA (`STATE  n:` 块 + 吸收光谱表)
//! - TURBOMOLE `escf` 与 `ricc2`
//! - tdkit 自身导出的 CSV（`export --format csv`）
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: gaussian, orca, turbomole, mo_labels

pub mod gaussian;
pub mod mo_labels;
pub mod orca;
pub mod turbomole;

use crate::error::{Result, TdError};
use crate::export::csv as csv_export;
use crate::models::{assign_energy_ranks, ExcitedState};

use regex::Regex;
use std::fs;
use std::path::Path;

pub use mo_labels::OrbitalLabels;

/// 输出文件格式（来源程序）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Gaussian,
    Orca,
    TurbomoleEscf,
    TurbomoleRicc2,
    /// 之前导出的 CSV 表
    Csv,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Gaussian => write!(f, "Gaussian"),
            LogFormat::Orca => write!(f, "ORCA"),
            LogFormat::TurbomoleEscf => write!(f, "TURBOMOLE escf"),
            LogFormat::TurbomoleRicc2 => write!(f, "TURBOMOLE ricc2"),
            LogFormat::Csv => write!(f, "tdkit CSV"),
        }
    }
}

impl LogFormat {
    /// 按格式提取所有激发态块，每个块单独成功或失败
    pub fn extract(&self, text: &str) -> Result<Vec<Result<ExcitedState>>> {
        match self {
            LogFormat::Gaussian => gaussian::parse_tddft(text),
            LogFormat::Orca => orca::parse_tddft(text),
            LogFormat::TurbomoleEscf => turbomole::parse_escf(text),
            LogFormat::TurbomoleRicc2 => turbomole::parse_ricc2(text),
            LogFormat::Csv => Ok(csv_export::read_states(text)),
        }
    }
}

/// 一次解析的结果
#[derive(Debug, Clone)]
pub struct ParsedLog {
    pub format: LogFormat,
    /// 按文件中出现顺序排列，已赋予能量排名
    pub states: Vec<ExcitedState>,
    /// 被跳过的损坏块数量
    pub skipped: usize,
}

/// 从文件名和内容推断格式
pub fn detect_format(path: &Path, text: &str) -> Result<LogFormat> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if text.starts_with(csv_export::HEADER_LINE) {
        return Ok(LogFormat::Csv);
    }
    if name.contains("escf.out") {
        return Ok(LogFormat::TurbomoleEscf);
    }
    if name.contains("ricc2.out") {
        return Ok(LogFormat::TurbomoleRicc2);
    }

    if text.contains("* O   R   C   A *") {
        return Ok(LogFormat::Orca);
    }
    if text.contains("Entering Gaussian System")
        || text.contains("Gaussian, Inc.")
        || gaussian::has_excited_state_line(text)
    {
        return Ok(LogFormat::Gaussian);
    }
    if text.contains("e s c f") {
        return Ok(LogFormat::TurbomoleEscf);
    }
    if text.contains("R I C C 2") {
        return Ok(LogFormat::TurbomoleRicc2);
    }

    Err(TdError::UnrecognizedFormat {
        path: path.display().to_string(),
    })
}

/// 读取并解析输出文件
pub fn parse_log_file(path: &Path, ci_threshold: f64) -> Result<ParsedLog> {
    if !path.exists() {
        return Err(TdError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let text = fs::read_to_string(path).map_err(|e| TdError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let format = detect_format(path, &text)?;
    log::info!("Detected {} output in '{}'", format, path.display());

    let parsed = parse_log_content(&text, format, ci_threshold)?;
    if parsed.states.is_empty() {
        return Err(TdError::ParseError {
            format: format.to_string(),
            path: path.display().to_string(),
            reason: format!("no excited states found ({} malformed blocks)", parsed.skipped),
        });
    }
    Ok(parsed)
}

/// 从字符串内容解析（格式已知）
pub fn parse_log_content(text: &str, format: LogFormat, ci_threshold: f64) -> Result<ParsedLog> {
    let mut states = Vec::new();
    let mut skipped = 0;

    for block in format.extract(text)? {
        match block {
            Ok(mut state) => {
                state.finalize_contributions(ci_threshold);
                states.push(state);
            }
            Err(e) => {
                log::warn!("Skipping state block: {}", e);
                skipped += 1;
            }
        }
    }

    assign_energy_ranks(&mut states);

    Ok(ParsedLog {
        format,
        states,
        skipped,
    })
}

// ─────────────────────────────────────────────────────────────
// 各解析器共用的小工具
// ─────────────────────────────────────────────────────────────

/// 编译正则表达式
pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| TdError::Other(format!("Invalid pattern '{}': {}", pattern, e)))
}

/// 解析浮点数，兼容 Fortran 的 `D` 指数
pub(crate) fn parse_float(s: &str) -> Option<f64> {
    s.trim().replace(['D', 'd'], "E").parse().ok()
}

/// 多重度数值 -> 名称
pub(crate) fn multiplicity_name(mult: u32) -> &'static str {
    match mult {
        1 => "singlet",
        2 => "doublet",
        3 => "triplet",
        4 => "quartet",
        5 => "quintet",
        6 => "sextet",
        _ => "",
    }
}

/// 多重度名称 -> 数值
pub(crate) fn multiplicity_number(name: &str) -> Option<u32> {
    (1..=6).find(|&m| multiplicity_name(m).eq_ignore_ascii_case(name))
}

/// 自旋禁阻的态允许缺失振子强度（视为 0）
pub(crate) fn osc_may_be_absent(spin: &str) -> bool {
    !spin.is_empty() && !spin.eq_ignore_ascii_case("singlet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_by_filename() {
        let p = PathBuf::from("/tmp/calc/escf.out");
        assert_eq!(detect_format(&p, "").unwrap(), LogFormat::TurbomoleEscf);
        let p = PathBuf::from("job_ricc2.out");
        assert_eq!(detect_format(&p, "").unwrap(), LogFormat::TurbomoleRicc2);
    }

    #[test]
    fn test_detect_by_content() {
        let p = PathBuf::from("job.out");
        assert_eq!(
            detect_format(&p, "  * O   R   C   A *  \n").unwrap(),
            LogFormat::Orca
        );
        assert_eq!(
            detect_format(&p, " Entering Gaussian System, Link 0=g16\n").unwrap(),
            LogFormat::Gaussian
        );
    }

    #[test]
    fn test_detect_unrecognized() {
        let p = PathBuf::from("notes.txt");
        let err = detect_format(&p, "nothing to see here").unwrap_err();
        assert!(matches!(err, TdError::UnrecognizedFormat { .. }));
    }

    #[test]
    fn test_file_without_states_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.log");
        std::fs::write(&path, " Entering Gaussian System, Link 0=g16\n Normal termination\n").unwrap();
        assert!(matches!(
            parse_log_file(&path, 0.2),
            Err(TdError::ParseError { .. })
        ));
        assert!(matches!(
            parse_log_file(&dir.path().join("missing.log"), 0.2),
            Err(TdError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_parse_float_fortran() {
        assert_eq!(parse_float("1.5D-02"), Some(0.015));
        assert_eq!(parse_float(" 0.25 "), Some(0.25));
        assert_eq!(parse_float("****"), None);
    }

    #[test]
    fn test_malformed_blocks_are_skipped() {
        let text = "\
 Excited State   1:      Singlet-A      4.5000 eV  275.52 nm  f=0.1000  <S**2>=0.000
      45 -> 46         0.70000

 Excited State   2:      Singlet-A      ****** eV  ****** nm  f=0.2000  <S**2>=0.000

 Excited State   3:      Singlet-A      5.0000 eV  247.97 nm  f=0.8000  <S**2>=0.000
      44 -> 46         0.70000
";
        let parsed = parse_log_content(text, LogFormat::Gaussian, 0.2).unwrap();
        assert_eq!(parsed.states.len(), 2);
        assert_eq!(parsed.skipped, 1);
        let ranks: Vec<usize> = parsed.states.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }

    #[test]
    fn test_offset_shifts_parsed_energies() {
        let text = "\
 Excited State   1:      Singlet-A      4.5000 eV  275.52 nm  f=0.1000  <S**2>=0.000
      45 -> 46         0.70000

 Excited State   2:      Singlet-A      5.0000 eV  247.97 nm  f=0.8000  <S**2>=0.000
      44 -> 46         0.70000

 Excited State   3:      Singlet-A      4.8000 eV  258.30 nm  f=0.0000  <S**2>=0.000
      43 -> 46         0.70500
";
        let parsed = parse_log_content(text, LogFormat::Gaussian, 0.2).unwrap();
        let mut shifted = parsed.states.clone();
        let config = crate::filter::FilterConfig {
            energy_offset: -0.25,
            ..Default::default()
        };
        crate::filter::adjust(&mut shifted, &config);

        for (before, after) in parsed.states.iter().zip(&shifted) {
            assert_eq!(after.energy_ev, before.energy_ev - 0.25);
            assert_eq!(after.osc, before.osc);
        }
    }

    #[test]
    fn test_exported_csv_is_read_back() {
        let mut es = ExcitedState::new(3, "singlet", "b1", 4.2, 0.3);
        es.transitions.push(
            crate::models::MoTransition::new(
                crate::models::Orbital::new(45, "b1", crate::models::Spin::Alpha),
                crate::models::Orbital::new(46, "a2", crate::models::Spin::Alpha),
                crate::models::Direction::Excitation,
                0.69,
            )
            .with_weight(0.95),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.csv");
        csv_export::write_csv(&[es.clone()], &path).unwrap();

        let parsed = parse_log_file(&path, 0.2).unwrap();
        assert_eq!(parsed.format, LogFormat::Csv);
        assert_eq!(parsed.states.len(), 1);
        assert_eq!(parsed.states[0].irrep, "b1");
        assert_eq!(parsed.states[0].energy_ev, 4.2);
        assert_eq!(parsed.states[0].rank, 1);
        assert_eq!(parsed.states[0].transitions, es.transitions);
    }
}
