//! # CSV 导出与读取
//!
//! 列: `id,rank,spin,irrep,energy_ev,wavelength_nm,f,s2,transitions`
//!
//! 数值保留完整精度；`transitions` 列中每个跃迁编码为
//! `45 a alpha -> 46 a alpha <ci> <weight>`，多个跃迁以 `;` 分隔，可无损读回，
//! 因此导出的 CSV 可以再次作为任意子命令的输入。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs`, `commands/show.rs` 调用（写出）
//! - 被 `parsers/mod.rs` 调用（读回）
//! - 使用 `csv` + `serde` 读写记录

use crate::error::{Result, TdError};
use crate::models::{Direction, ExcitedState, MoTransition, Orbital, Spin};

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// 导出文件的表头
pub const HEADER_LINE: &str = "id,rank,spin,irrep,energy_ev,wavelength_nm,f,s2,transitions";

/// CSV 记录
#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    id: usize,
    rank: usize,
    spin: String,
    irrep: String,
    energy_ev: f64,
    wavelength_nm: f64,
    f: f64,
    s2: Option<f64>,
    transitions: String,
}

fn encode_transitions(es: &ExcitedState) -> String {
    es.transitions
        .iter()
        .map(|t| {
            format!(
                "{} {} {} {} {} {} {} {} {}",
                t.from.number,
                t.from.irrep,
                t.from.spin,
                t.direction.arrow(),
                t.to.number,
                t.to.irrep,
                t.to.spin,
                t.ci_coeff,
                t.weight_or_zero()
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn decode_transition(id: usize, field: &str) -> Result<MoTransition> {
    let parts: Vec<&str> = field.split_whitespace().collect();
    let [from, from_irrep, from_spin, arrow, to, to_irrep, to_spin, ci, weight] = parts.as_slice() else {
        return Err(TdError::malformed("CSV", id, format!("invalid transition '{}'", field)));
    };

    let number = |s: &str| {
        s.parse::<u32>()
            .map_err(|_| TdError::malformed("CSV", id, format!("invalid orbital '{}'", s)))
    };
    let float = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| TdError::malformed("CSV", id, format!("invalid number '{}'", s)))
    };
    let direction = match *arrow {
        "->" => Direction::Excitation,
        "<-" => Direction::Deexcitation,
        other => {
            return Err(TdError::malformed("CSV", id, format!("invalid direction '{}'", other)))
        }
    };

    Ok(MoTransition::new(
        Orbital::new(number(*from)?, *from_irrep, Spin::from_label(from_spin)),
        Orbital::new(number(*to)?, *to_irrep, Spin::from_label(to_spin)),
        direction,
        float(*ci)?,
    )
    .with_weight(float(*weight)?))
}

/// 写出 CSV 记录到任意输出（例如 stdout）
pub fn to_writer<W: Write>(states: &[ExcitedState], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    serialize_states(&mut wtr, states)?;
    wtr.flush()
        .map_err(|e| TdError::Other(format!("Failed to write CSV: {}", e)))
}

/// 写出 CSV 文件
pub fn write_csv(states: &[ExcitedState], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    serialize_states(&mut wtr, states)?;

    wtr.flush().map_err(|e| TdError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

fn serialize_states<W: Write>(wtr: &mut csv::Writer<W>, states: &[ExcitedState]) -> Result<()> {
    for es in states {
        wtr.serialize(CsvRecord {
            id: es.id,
            rank: es.rank,
            spin: es.spin.clone(),
            irrep: es.irrep.clone(),
            energy_ev: es.energy_ev,
            wavelength_nm: es.wavelength_nm(),
            f: es.osc,
            s2: es.s2,
            transitions: encode_transitions(es),
        })?;
    }
    Ok(())
}

/// 读回导出的 CSV 文本，每一行单独成功或失败
pub fn read_states(text: &str) -> Vec<Result<ExcitedState>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    reader
        .deserialize::<CsvRecord>()
        .map(|record| record.map_err(TdError::from).and_then(record_to_state))
        .collect()
}

fn record_to_state(record: CsvRecord) -> Result<ExcitedState> {
    let mut es = ExcitedState::new(record.id, record.spin, record.irrep, record.energy_ev, record.f);
    es.rank = record.rank;
    es.s2 = record.s2;
    for field in record.transitions.split(';').filter(|s| !s.trim().is_empty()) {
        es.transitions.push(decode_transition(record.id, field)?);
    }
    Ok(es)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_csv_round_trip() {
        let mut a = ExcitedState::new(1, "singlet", "B1u", 4.123456789, 0.0123456789);
        a.rank = 2;
        a.s2 = Some(0.0);
        a.transitions.push(
            MoTransition::new(
                Orbital::new(45, "b2g", Spin::Alpha),
                Orbital::new(46, "au", Spin::Beta),
                Direction::Excitation,
                -0.69,
            )
            .with_weight(0.9522),
        );
        let mut b = ExcitedState::new(2, "3.010", "A'", 3.9, 0.0);
        b.rank = 1;

        let dir = tempdir().unwrap();
        let path = dir.path().join("export.csv");
        write_csv(&[a.clone(), b.clone()], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(HEADER_LINE));

        let back: Vec<ExcitedState> = read_states(&text).into_iter().collect::<Result<_>>().unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0], a);
        assert_eq!(back[1].spin, "3.010");
        assert_eq!(back[1].irrep, "A'");
        assert_eq!(back[1].energy_ev, 3.9);
        assert_eq!(back[1].s2, None);
        assert!(back[1].transitions.is_empty());
    }

    #[test]
    fn test_to_writer_header() {
        let mut buf = Vec::new();
        to_writer(&[ExcitedState::new(7, "singlet", "A", 4.0, 0.25)], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER_LINE));
        assert!(lines.next().unwrap().starts_with("7,0,singlet,A,4.0,"));
    }

    #[test]
    fn test_bad_row_fails_alone() {
        let text = format!(
            "{}\n1,1,singlet,a,4.0,309.96,0.1,,45 a alpha => 46 a alpha 0.7 0.98\n2,2,singlet,a,5.0,247.97,0.2,,\n",
            HEADER_LINE
        );
        let rows = read_states(&text);
        assert_eq!(rows.len(), 2);
        assert!(matches!(rows[0], Err(TdError::MalformedRecord { .. })));
        assert_eq!(rows[1].as_ref().unwrap().id, 2);
    }
}
