//! # export 命令实现
//!
//! 把日志中的作业导出为 XYZ 轨迹或 CSV 数据表。
//!
//! ## 依赖关系
//! - 使用 `cli/export.rs` 定义的参数
//! - 使用 `export/xyz.rs`, `export/csv.rs`
//! - 使用 `utils/output.rs`

use std::path::PathBuf;

use crate::cli::export::{ExportArgs, ExportTarget};
use crate::error::{GrrmKitError, Result};
use crate::export::{csv as csv_export, write_text_file, xyz};
use crate::models::{FreqJob, GrrmLog, IrcJob, Job, LupJob, LupPath, OptJob};
use crate::utils::output;

/// 执行 export 命令
pub fn execute(args: ExportArgs) -> Result<()> {
    let (log, _) = super::load_log(&args.log_file, args.com_file.as_deref())?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args));

    match args.target {
        ExportTarget::OptTrajectory => {
            let job = select_opt(&log, args.job)?;
            write_text_file(&output_path, &xyz::opt_trajectory_xyz(job))?;
        }
        ExportTarget::IrcPath => {
            let job = select_irc(&log, args.job)?;
            write_text_file(&output_path, &xyz::full_irc_xyz(job, args.reverse)?)?;
        }
        ExportTarget::LupNodes => {
            let job = select_lup(&log, args.job)?;
            let iteration = select_iteration(job, args.iteration)?;
            let content = match &args.node_range {
                Some(range) => {
                    let (start, end) = parse_node_range(range)?;
                    xyz::lup_truncated_xyz(iteration, start, end)?
                }
                None => xyz::lup_nodes_xyz(iteration),
            };
            write_text_file(&output_path, &content)?;
        }
        ExportTarget::Approximate => {
            let content = approximate_xyz(&log, args.job)?;
            write_text_file(&output_path, &content)?;
        }
        ExportTarget::ModeAnimation => {
            let job = select_freq(&log, args.job)?;
            let content = xyz::mode_animation_xyz(job, args.mode, args.max_shift, args.step)?;
            write_text_file(&output_path, &content)?;
        }
        ExportTarget::IrcProfile => {
            let job = select_irc(&log, args.job)?;
            let mut writer = csv_export::open_writer(&output_path)?;
            csv_export::write_irc_profile(&mut writer, job)?;
        }
        ExportTarget::LupProfile => {
            let job = select_lup(&log, args.job)?;
            let iteration = select_iteration(job, args.iteration)?;
            let mut writer = csv_export::open_writer(&output_path)?;
            csv_export::write_lup_profile(&mut writer, iteration)?;
        }
        ExportTarget::AfirProfile => {
            let afir = log.afir_path.as_ref().ok_or_else(|| {
                GrrmKitError::InvalidArgument(
                    "the log has no AFIR path summary section".to_string(),
                )
            })?;
            let mut writer = csv_export::open_writer(&output_path)?;
            csv_export::write_afir_profile(&mut writer, afir)?;
        }
        ExportTarget::Convergence => {
            let job = select_opt(&log, args.job)?;
            let mut writer = csv_export::open_writer(&output_path)?;
            csv_export::write_opt_convergence(&mut writer, job)?;
        }
        ExportTarget::Thermal => {
            let job = select_freq(&log, args.job)?;
            let mut writer = csv_export::open_writer(&output_path)?;
            csv_export::write_thermal_table(&mut writer, job)?;
        }
    }

    output::print_done(&format!("Exported to '{}'", output_path.display()));
    Ok(())
}

fn default_output(args: &ExportArgs) -> PathBuf {
    let suffix = match args.target {
        ExportTarget::ModeAnimation => format!("mode{}", args.mode),
        other => other.suffix().to_string(),
    };
    super::default_output(&args.log_file, &suffix, args.target.extension())
}

/// 选取第 `index` 个作业
fn select_job(log: &GrrmLog, index: usize) -> Result<&Job> {
    log.jobs.get(index).ok_or_else(|| {
        GrrmKitError::InvalidArgument(format!(
            "job index {} is outside the log ({} jobs)",
            index,
            log.jobs.len()
        ))
    })
}

fn kind_mismatch(expected: &str, job: &Job, index: usize) -> GrrmKitError {
    GrrmKitError::InvalidArgument(format!(
        "job {} is a {} job, expected {}",
        index,
        job.kind(),
        expected
    ))
}

fn select_opt(log: &GrrmLog, index: usize) -> Result<&OptJob> {
    match select_job(log, index)? {
        Job::Opt(job) => Ok(job),
        other => Err(kind_mismatch("OPT", other, index)),
    }
}

fn select_irc(log: &GrrmLog, index: usize) -> Result<&IrcJob> {
    match select_job(log, index)? {
        Job::Irc(job) => Ok(job),
        other => Err(kind_mismatch("IRC", other, index)),
    }
}

fn select_lup(log: &GrrmLog, index: usize) -> Result<&LupJob> {
    match select_job(log, index)? {
        Job::Lup(job) => Ok(job),
        other => Err(kind_mismatch("LUP", other, index)),
    }
}

fn select_freq(log: &GrrmLog, index: usize) -> Result<&FreqJob> {
    match select_job(log, index)? {
        Job::Freq(job) => Ok(job),
        other => Err(kind_mismatch("FREQ", other, index)),
    }
}

/// LUP 迭代选择，缺省取末次
fn select_iteration(job: &LupJob, iteration: Option<usize>) -> Result<&LupPath> {
    match iteration {
        Some(i) => job.iterations.get(i).ok_or_else(|| {
            GrrmKitError::InvalidArgument(format!(
                "iteration {} is outside the job ({} iterations)",
                i,
                job.iterations.len()
            ))
        }),
        None => job.iterations.last().ok_or_else(|| {
            GrrmKitError::InvalidArgument("the LUP job has no iterations".to_string())
        }),
    }
}

/// 近似结构来源: 指定的 LUP 作业，或日志末尾的 AFIR 段落
fn approximate_xyz(log: &GrrmLog, index: usize) -> Result<String> {
    if let Some(Job::Lup(job)) = log.jobs.get(index) {
        if !job.approximate_structures.is_empty() {
            return Ok(xyz::approximate_structures_xyz(&job.approximate_structures));
        }
    }
    if let Some(afir) = &log.afir_path {
        if !afir.approximate_structures.is_empty() {
            let mut out = String::new();
            for approx in &afir.approximate_structures {
                out.push_str(&xyz::structure_xyz(&approx.structure, None));
            }
            return Ok(out);
        }
    }
    Err(GrrmKitError::InvalidArgument(
        "no approximate structures found in the selected job or the AFIR summary".to_string(),
    ))
}

/// 解析 "start-end" 节点区间
fn parse_node_range(range: &str) -> Result<(usize, usize)> {
    let invalid = || {
        GrrmKitError::InvalidArgument(format!(
            "invalid node range '{}' (expected 'start-end')",
            range
        ))
    };
    let (start, end) = range.split_once('-').ok_or_else(invalid)?;
    let start: usize = start.trim().parse().map_err(|_| invalid())?;
    let end: usize = end.trim().parse().map_err(|_| invalid())?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_range() {
        assert_eq!(parse_node_range("2-7").unwrap(), (2, 7));
        assert_eq!(parse_node_range(" 0 - 3 ").unwrap(), (0, 3));
        assert!(parse_node_range("7").is_err());
        assert!(parse_node_range("a-b").is_err());
    }
}
