//! # 能量剖面与收敛历史图表
//!
//! 使用 `plotters` 库绘制：
//! - 路径能量剖面（IRC / LUP / AFIR 通用的长度-能量曲线）
//! - 优化能量历史
//! - 2x2 收敛指标面板（值曲线 + 阈值参考线）
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs` 调用
//! - 使用 `models/` 数据模型
//! - 使用 `plotters` 渲染图表

use plotters::prelude::*;
use std::path::Path;

use rust_decimal::prelude::ToPrimitive;

use crate::error::{GrrmKitError, Result};
use crate::models::opt::OptJob;

/// 轴范围: 上下各放 5% 余量；序列为常数时放一个极小量防止空区间
fn axis_limits(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 0.00001, max + 0.00001);
    }
    let buffer = (max - min) * 0.05;
    (min - buffer, max + buffer)
}

pub(crate) fn decimal_to_f64(value: &rust_decimal::Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// 绘制长度-能量剖面曲线
#[allow(clippy::too_many_arguments)]
pub fn plot_profile(
    points: &[(f64, f64)],
    output_path: &Path,
    title: &str,
    x_desc: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if points.is_empty() {
        return Err(GrrmKitError::InvalidArgument(
            "profile has no points to plot".to_string(),
        ));
    }
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_profile_chart(&root, points, title, x_desc)?;
        root.present()
            .map_err(|e| GrrmKitError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_profile_chart(&root, points, title, x_desc)?;
        root.present()
            .map_err(|e| GrrmKitError::Other(e.to_string()))?;
    }
    Ok(())
}

fn draw_profile_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    points: &[(f64, f64)],
    title: &str,
    x_desc: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;

    let (x_min, x_max) = axis_limits(points.iter().map(|(x, _)| *x));
    let (y_min, y_max) = axis_limits(points.iter().map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Energy (Hartree)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;

    let line_color = RGBColor(0, 102, 204);
    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            line_color.stroke_width(2),
        ))
        .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;
    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 3, line_color.filled())),
        )
        .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;

    Ok(())
}

/// 绘制优化能量历史（迭代号-能量）
pub fn plot_opt_energy(
    job: &OptJob,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    let points: Vec<(f64, f64)> = job
        .energy_series()
        .iter()
        .enumerate()
        .map(|(i, e)| (i as f64, decimal_to_f64(e)))
        .collect();
    plot_profile(&points, output_path, title, "Iteration", width, height, use_svg)
}

/// 绘制 2x2 收敛指标面板
///
/// 面板顺序: 最大力 / RMS 力 / 最大位移 / RMS 位移，
/// 各面板叠加红色阈值参考线。
pub fn plot_opt_convergence(
    job: &OptJob,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if job.iterations.is_empty() {
        return Err(GrrmKitError::InvalidArgument(
            "optimization job has no iterations to plot".to_string(),
        ));
    }
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_convergence_panels(&root, job, title)?;
        root.present()
            .map_err(|e| GrrmKitError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_convergence_panels(&root, job, title)?;
        root.present()
            .map_err(|e| GrrmKitError::Other(e.to_string()))?;
    }
    Ok(())
}

fn draw_convergence_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    job: &OptJob,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;
    root.titled(title, ("sans-serif", 28).into_font())
        .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;

    let panels = root.margin(40, 10, 10, 10).split_evenly((2, 2));
    let series: [(&str, Vec<(f64, f64)>, f64); 4] = [
        (
            "Maximum Force",
            metric_series(job, |m| &m.maximum_force),
            decimal_to_f64(&job.iterations[0].metrics.maximum_force.threshold),
        ),
        (
            "RMS Force",
            metric_series(job, |m| &m.rms_force),
            decimal_to_f64(&job.iterations[0].metrics.rms_force.threshold),
        ),
        (
            "Maximum Displacement",
            metric_series(job, |m| &m.maximum_displacement),
            decimal_to_f64(&job.iterations[0].metrics.maximum_displacement.threshold),
        ),
        (
            "RMS Displacement",
            metric_series(job, |m| &m.rms_displacement),
            decimal_to_f64(&job.iterations[0].metrics.rms_displacement.threshold),
        ),
    ];

    for (panel, (name, points, threshold)) in panels.iter().zip(series.iter()) {
        let (x_min, x_max) = axis_limits(points.iter().map(|(x, _)| *x));
        let (y_min, y_max) =
            axis_limits(points.iter().map(|(_, y)| *y).chain(std::iter::once(*threshold)));

        let mut chart = ChartBuilder::on(panel)
            .caption(*name, ("sans-serif", 18).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;

        chart
            .configure_mesh()
            .x_label_style(("sans-serif", 12))
            .y_label_style(("sans-serif", 12))
            .draw()
            .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;

        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                RGBColor(0, 102, 204).stroke_width(2),
            ))
            .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;
        chart
            .draw_series(LineSeries::new(
                [(x_min, *threshold), (x_max, *threshold)],
                RED.stroke_width(1),
            ))
            .map_err(|e| GrrmKitError::Other(format!("{:?}", e)))?;
    }

    Ok(())
}

fn metric_series<F>(job: &OptJob, pick: F) -> Vec<(f64, f64)>
where
    F: Fn(&crate::models::opt::ConvergenceMetrics) -> &crate::models::opt::MetricValue,
{
    job.iterations
        .iter()
        .enumerate()
        .map(|(i, it)| (i as f64, decimal_to_f64(&pick(&it.metrics).value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_limits_buffer() {
        let (min, max) = axis_limits([0.0_f64, 10.0].into_iter());
        assert_eq!(min, -0.5);
        assert_eq!(max, 10.5);
    }

    #[test]
    fn test_axis_limits_flat_series() {
        let (min, max) = axis_limits([2.0_f64, 2.0].into_iter());
        assert!(min < 2.0 && max > 2.0);
        assert!((max - min - 0.00002).abs() < 1e-12);
    }

    #[test]
    fn test_axis_limits_empty() {
        assert_eq!(axis_limits(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn test_empty_profile_is_rejected() {
        let path = std::env::temp_dir().join("grrmkit-empty-profile.png");
        assert!(matches!(
            plot_profile(&[], &path, "t", "x", 800, 600, false),
            Err(GrrmKitError::InvalidArgument(_))
        ));
    }
}
