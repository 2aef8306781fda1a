//! # 光谱图表生成
//!
//! 使用 `plotters` 绘制展宽的 UV-Vis 吸收曲线，并以竖线标出各激发态的振子强度。
//!
//! ## 功能
//! - 连续曲线 + 填充区域
//! - 振子强度竖线（按曲线最大值缩放），高亮态使用醒目颜色
//! - 可选极大值位置标注
//! - 根据扩展名输出 PNG 或 SVG
//!
//! ## 依赖关系
//! - 被 `commands/spectrum.rs` 调用
//! - 使用 `spectrum/broadening.rs` 的 Spectrum 结构
//! - 使用 `plotters` 渲染图表

use crate::error::{Result, TdError};
use crate::spectrum::Spectrum;

use plotters::prelude::*;
use std::path::Path;

/// 绘图选项
#[derive(Debug, Clone)]
pub struct PlotOptions<'a> {
    pub title: &'a str,
    pub width: u32,
    pub height: u32,
    /// 高亮的 (λ, f)
    pub highlighted: &'a [(f64, f64)],
    /// 标注的极大值 (λ, ε)
    pub maxima: &'a [(f64, f64)],
}

fn plot_error<E: std::fmt::Debug>(e: E) -> TdError {
    TdError::PlotError(format!("{:?}", e))
}

/// 生成光谱图（扩展名为 .svg 时输出 SVG，否则 PNG）
pub fn generate_spectrum_plot(spectrum: &Spectrum, output_path: &Path, options: &PlotOptions) -> Result<()> {
    let use_svg = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if use_svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_spectrum_chart(&root, spectrum, options)?;
        root.present().map_err(plot_error)?;
    } else {
        let root = BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_spectrum_chart(&root, spectrum, options)?;
        root.present().map_err(plot_error)?;
    }
    Ok(())
}

/// 绘制光谱图表
fn draw_spectrum_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    spectrum: &Spectrum,
    options: &PlotOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    let data = &spectrum.nm_curve;
    let x_min = data.first().map(|(x, _)| *x).unwrap_or(200.0);
    let x_max = data.last().map(|(x, _)| *x).unwrap_or(600.0);

    let curve_max = data.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max);
    let f_max = spectrum
        .nm_impulses
        .iter()
        .map(|(_, f)| *f)
        .fold(0.0_f64, f64::max);
    let y_top = if curve_max > 0.0 { curve_max } else { 1.0 };
    // 竖线缩放到曲线高度
    let stick_scale = if f_max > 0.0 { y_top / f_max } else { 0.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(options.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, 0.0..y_top * 1.1)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("λ / nm")
        .y_desc("ε (arb. units)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    let line_color = RGBColor(0, 102, 204);
    chart
        .draw_series(LineSeries::new(
            data.iter().map(|(x, y)| (*x, *y)),
            line_color.stroke_width(2),
        ))
        .map_err(plot_error)?;

    chart
        .draw_series(AreaSeries::new(
            data.iter().map(|(x, y)| (*x, *y)),
            0.0,
            line_color.mix(0.2),
        ))
        .map_err(plot_error)?;

    let stick_color = RGBColor(90, 90, 90);
    for &(l, f) in &spectrum.nm_impulses {
        if f <= 0.0 || l < x_min || l > x_max {
            continue;
        }
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(l, 0.0), (l, f * stick_scale)],
                stick_color.stroke_width(1),
            )))
            .map_err(plot_error)?;
    }

    let highlight_color = RGBColor(204, 0, 0);
    for &(l, f) in options.highlighted {
        if l < x_min || l > x_max {
            continue;
        }
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(l, 0.0), (l, f * stick_scale)],
                highlight_color.stroke_width(3),
            )))
            .map_err(plot_error)?;
    }

    for &(l, y) in options.maxima {
        let text_style = ("sans-serif", 12).into_font().color(&BLACK);
        chart
            .draw_series(std::iter::once(Text::new(
                format!("{:.1}", l),
                (l, y + y_top * 0.03),
                text_style,
            )))
            .map_err(plot_error)?;
    }

    Ok(())
}

