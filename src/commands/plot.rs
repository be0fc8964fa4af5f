//! # plot 命令实现
//!
//! 把日志中的能量剖面与收敛历史绘制成 PNG/SVG 图表。
//!
//! ## 依赖关系
//! - 使用 `cli/plot.rs` 定义的参数
//! - 使用 `plot/` 图表渲染
//! - 使用 `utils/output.rs`

use std::path::PathBuf;

use crate::cli::plot::{PlotArgs, PlotKind};
use crate::error::{GrrmKitError, Result};
use crate::models::{GrrmLog, Job};
use crate::plot;
use crate::utils::output;

/// 执行 plot 命令
pub fn execute(args: PlotArgs) -> Result<()> {
    let (log, _) = super::load_log(&args.log_file, args.com_file.as_deref())?;
    let output_path = args.output.clone().unwrap_or_else(|| default_output(&args));

    let title = args
        .log_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("GRRM log")
        .to_string();

    match args.kind {
        PlotKind::IrcProfile => {
            let job = select_irc(&log, args.job)?;
            let points: Vec<(f64, f64)> = job
                .profile
                .iter()
                .map(|p| {
                    (
                        plot::decimal_to_f64(&p.length),
                        plot::decimal_to_f64(&p.energy),
                    )
                })
                .collect();
            plot::plot_profile(
                &points,
                &output_path,
                &format!("{} - IRC profile", title),
                "Path Length (bohr)",
                args.width,
                args.height,
                args.svg,
            )?;
        }
        PlotKind::LupProfile => {
            let job = match select_job(&log, args.job)? {
                Job::Lup(job) => job,
                other => {
                    return Err(GrrmKitError::InvalidArgument(format!(
                        "job {} is a {} job, expected LUP",
                        args.job,
                        other.kind()
                    )))
                }
            };
            let iteration = match args.iteration {
                Some(i) => job.iterations.get(i).ok_or_else(|| {
                    GrrmKitError::InvalidArgument(format!(
                        "iteration {} is outside the job ({} iterations)",
                        i,
                        job.iterations.len()
                    ))
                })?,
                None => job.iterations.last().ok_or_else(|| {
                    GrrmKitError::InvalidArgument("the LUP job has no iterations".to_string())
                })?,
            };
            let points: Vec<(f64, f64)> = iteration
                .profile
                .iter()
                .map(|p| {
                    (
                        plot::decimal_to_f64(&p.length),
                        plot::decimal_to_f64(&p.energy),
                    )
                })
                .collect();
            plot::plot_profile(
                &points,
                &output_path,
                &format!("{} - {}", title, iteration.name),
                "Path Length",
                args.width,
                args.height,
                args.svg,
            )?;
        }
        PlotKind::AfirProfile => {
            let afir = log.afir_path.as_ref().ok_or_else(|| {
                GrrmKitError::InvalidArgument(
                    "the log has no AFIR path summary section".to_string(),
                )
            })?;
            let points: Vec<(f64, f64)> = afir
                .points
                .iter()
                .map(|p| {
                    (
                        plot::decimal_to_f64(&p.length),
                        plot::decimal_to_f64(&p.energy),
                    )
                })
                .collect();
            plot::plot_profile(
                &points,
                &output_path,
                &format!("{} - AFIR path", title),
                "Path Length",
                args.width,
                args.height,
                args.svg,
            )?;
        }
        PlotKind::OptEnergy => {
            let job = select_opt(&log, args.job)?;
            plot::plot_opt_energy(
                job,
                &output_path,
                &format!("{} - energy history", title),
                args.width,
                args.height,
                args.svg,
            )?;
        }
        PlotKind::Convergence => {
            let job = select_opt(&log, args.job)?;
            plot::plot_opt_convergence(
                job,
                &output_path,
                &format!("{} - convergence", title),
                args.width,
                args.height,
                args.svg,
            )?;
        }
    }

    output::print_done(&format!("Plot saved to '{}'", output_path.display()));
    Ok(())
}

fn default_output(args: &PlotArgs) -> PathBuf {
    let ext = if args.svg { "svg" } else { "png" };
    super::default_output(&args.log_file, args.kind.suffix(), ext)
}

fn select_job(log: &GrrmLog, index: usize) -> Result<&Job> {
    log.jobs.get(index).ok_or_else(|| {
        GrrmKitError::InvalidArgument(format!(
            "job index {} is outside the log ({} jobs)",
            index,
            log.jobs.len()
        ))
    })
}

fn select_opt<'a>(log: &'a GrrmLog, index: usize) -> Result<&'a crate::models::OptJob> {
    match select_job(log, index)? {
        Job::Opt(job) => Ok(job),
        other => Err(GrrmKitError::InvalidArgument(format!(
            "job {} is a {} job, expected OPT",
            index,
            other.kind()
        ))),
    }
}

fn select_irc<'a>(log: &'a GrrmLog, index: usize) -> Result<&'a crate::models::IrcJob> {
    match select_job(log, index)? {
        Job::Irc(job) => Ok(job),
        other => Err(GrrmKitError::InvalidArgument(format!(
            "job {} is a {} job, expected IRC",
            index,
            other.kind()
        ))),
    }
}
