//! # 光谱数据导出
//!
//! ## 支持格式
//! - 数据块: 两列空白分隔，块间两个空行（gnuplot `index` 可直接读取）
//!   1. nm 曲线  2. nm 脉冲  3. eV 曲线  4. eV 脉冲
//!   可选: 5. 高亮的 nm 脉冲  6. nm 曲线极大值
//! - CSV: nm 与 eV 曲线各一个文件 (`wavelength_nm,epsilon` / `energy_ev,epsilon`)
//!
//! ## 依赖关系
//! - 被 `commands/spectrum.rs` 调用
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{Result, TdError};
use crate::spectrum::Spectrum;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// 附加数据块
#[derive(Debug, Clone, Default)]
pub struct ExtraBlocks {
    /// 高亮的 (λ, f)
    pub highlighted: Vec<(f64, f64)>,
    /// 检测到的极大值 (λ, ε)
    pub maxima: Option<Vec<(f64, f64)>>,
}

/// 写出全部数据块
pub fn write_blocks<W: Write>(out: &mut W, spectrum: &Spectrum, extras: &ExtraBlocks) -> io::Result<()> {
    let mut blocks: Vec<&[(f64, f64)]> = vec![
        &spectrum.nm_curve,
        &spectrum.nm_impulses,
        &spectrum.ev_curve,
        &spectrum.ev_impulses,
    ];
    if !extras.highlighted.is_empty() {
        blocks.push(&extras.highlighted);
    }
    if let Some(ref maxima) = extras.maxima {
        blocks.push(maxima);
    }

    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
            writeln!(out)?;
        }
        for (x, y) in block.iter() {
            writeln!(out, "{} {}", x, y)?;
        }
    }
    out.flush()
}

/// 写出数据块到文件
pub fn blocks_to_file(spectrum: &Spectrum, extras: &ExtraBlocks, output_path: &Path) -> Result<()> {
    let to_write_error = |e: io::Error| TdError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    };

    let file = File::create(output_path).map_err(to_write_error)?;
    let mut writer = BufWriter::new(file);
    write_blocks(&mut writer, spectrum, extras).map_err(to_write_error)
}

/// 导出展宽曲线为 CSV 格式
pub fn curve_to_csv(data: &[(f64, f64)], x_header: &str, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([x_header, "epsilon"])?;
    for (x, y) in data {
        wtr.write_record(&[format!("{:.4}", x), format!("{:.6e}", y)])?;
    }

    wtr.flush().map_err(|e| TdError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tiny_spectrum() -> Spectrum {
        Spectrum {
            nm_curve: vec![(200.0, 0.5), (200.5, 1.0)],
            nm_impulses: vec![(200.5, 0.1)],
            ev_curve: vec![(6.0, 1.0)],
            ev_impulses: vec![(6.1, 0.1)],
        }
    }

    #[test]
    fn test_four_blocks_separated_by_two_blank_lines() {
        let mut buf = Vec::new();
        write_blocks(&mut buf, &tiny_spectrum(), &ExtraBlocks::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let blocks: Vec<&str> = text.trim_end().split("\n\n\n").collect();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0], "200 0.5\n200.5 1");
        assert_eq!(blocks[1], "200.5 0.1");
        assert_eq!(blocks[3], "6.1 0.1");
    }

    #[test]
    fn test_extra_blocks() {
        let extras = ExtraBlocks {
            highlighted: vec![(200.5, 0.1)],
            maxima: Some(vec![(200.5, 1.0)]),
        };
        let mut buf = Vec::new();
        write_blocks(&mut buf, &tiny_spectrum(), &extras).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.trim_end().split("\n\n\n").count(), 6);
    }

    #[test]
    fn test_curve_to_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spectrum_nm.csv");
        curve_to_csv(&tiny_spectrum().nm_curve, "wavelength_nm", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("wavelength_nm,epsilon"));
        assert_eq!(lines.next(), Some("200.0000,5.000000e-1"));
    }
}
