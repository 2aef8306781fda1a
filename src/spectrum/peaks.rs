//! # 峰值检测
//!
//! 前瞻窗口极值扫描：当曲线从候选极大值下降超过 `delta`，
//! 且随后 `lookahead` 个采样点内没有更大的值时，接受该极大值（极小值对称处理）。
//! 扫描得到的第一个极值只是起点，会被丢弃。
//!
//! ## 依赖关系
//! - 被 `commands/spectrum.rs`, `spectrum/export.rs` 使用

use crate::error::{Result, TdError};

/// 检测到的极值 (x, y)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extrema {
    pub maxima: Vec<(f64, f64)>,
    pub minima: Vec<(f64, f64)>,
}

/// 在采样曲线上检测极大值和极小值
pub fn detect(points: &[(f64, f64)], lookahead: usize, delta: f64) -> Result<Extrema> {
    if lookahead == 0 {
        return Err(TdError::InvalidArgument(
            "lookahead must be at least 1".to_string(),
        ));
    }
    if !(delta >= 0.0) {
        return Err(TdError::InvalidArgument(format!(
            "delta must be non-negative, got {}",
            delta
        )));
    }

    let mut extrema = Extrema::default();
    // true = 极大值, false = 极小值，按发现顺序
    let mut found: Vec<bool> = Vec::new();

    let length = points.len();
    let mut mx = f64::NEG_INFINITY;
    let mut mn = f64::INFINITY;
    let mut mx_pos = 0.0;
    let mut mn_pos = 0.0;

    for index in 0..length.saturating_sub(lookahead) {
        let (x, y) = points[index];
        if y > mx {
            mx = y;
            mx_pos = x;
        }
        if y < mn {
            mn = y;
            mn_pos = x;
        }

        let window = &points[index..index + lookahead];

        if y < mx - delta && mx != f64::INFINITY {
            let window_max = window.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
            if window_max < mx {
                extrema.maxima.push((mx_pos, mx));
                found.push(true);
                mx = f64::INFINITY;
                mn = f64::INFINITY;
                if index + lookahead >= length {
                    break;
                }
                continue;
            }
        }

        if y > mn + delta && mn != f64::NEG_INFINITY {
            let window_min = window.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
            if window_min > mn {
                extrema.minima.push((mn_pos, mn));
                found.push(false);
                mn = f64::NEG_INFINITY;
                mx = f64::NEG_INFINITY;
                if index + lookahead >= length {
                    break;
                }
            }
        }
    }

    match found.first() {
        Some(true) => {
            extrema.maxima.remove(0);
        }
        Some(false) => {
            extrema.minima.remove(0);
        }
        None => {}
    }

    Ok(extrema)
}
