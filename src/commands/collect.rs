//! # collect 命令实现
//!
//! 收集目录中的 GRRM 日志并行解析，汇总成表格（可选 CSV 输出）。
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `batch/` 并行执行, `parsers/`
//! - 使用 `utils/output.rs`, `tabled`, `csv`

use std::path::Path;

use rust_decimal::Decimal;
use tabled::{Table, Tabled};

use crate::batch::{BatchRunner, LogCollector};
use crate::cli::collect::CollectArgs;
use crate::error::{GrrmKitError, Result};
use crate::models::{fixed12, Job};
use crate::parsers::com::{find_parent_com_file, parse_com_file};
use crate::parsers::log::parse_log_file;
use crate::utils::output;

/// 单个日志的汇总
struct LogSummary {
    jobs: Vec<String>,
    /// 末个作业的终态能量
    final_energy: Option<Decimal>,
    normal_termination: bool,
    has_afir_path: bool,
}

/// 汇总表行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Jobs")]
    jobs: String,
    #[tabled(rename = "Final E")]
    final_energy: String,
    #[tabled(rename = "Termination")]
    termination: String,
    #[tabled(rename = "AFIR")]
    afir: String,
    #[tabled(rename = "Note")]
    note: String,
}

/// 执行 collect 命令
pub fn execute(args: CollectArgs) -> Result<()> {
    output::print_header("Collecting GRRM Logs");

    if !args.input.exists() {
        return Err(GrrmKitError::DirectoryNotFound {
            path: args.input.display().to_string(),
        });
    }

    let collector = LogCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive);
    let files = collector.collect();
    if files.is_empty() {
        return Err(GrrmKitError::NoFilesFound {
            pattern: collector.pattern_string(),
        });
    }

    output::print_info(&format!("Parsing {} log files...", files.len()));

    let runner = BatchRunner::new(args.jobs);
    let outcomes = runner.run(files, "Parsing", |path| summarize_log(path));

    let mut rows = Vec::with_capacity(outcomes.len());
    let mut failed = 0usize;
    for outcome in &outcomes {
        let file = outcome.path.display().to_string();
        match &outcome.result {
            Ok(summary) => rows.push(SummaryRow {
                file,
                jobs: if summary.jobs.is_empty() {
                    "-".to_string()
                } else {
                    summary.jobs.join(" / ")
                },
                final_energy: summary
                    .final_energy
                    .map(|e| fixed12(&e))
                    .unwrap_or_else(|| "-".to_string()),
                termination: if summary.normal_termination {
                    "normal".to_string()
                } else {
                    "missing".to_string()
                },
                afir: if summary.has_afir_path { "yes" } else { "no" }.to_string(),
                note: String::new(),
            }),
            Err(e) => {
                failed += 1;
                rows.push(SummaryRow {
                    file,
                    jobs: "-".to_string(),
                    final_energy: "-".to_string(),
                    termination: "-".to_string(),
                    afir: "-".to_string(),
                    note: e.to_string(),
                });
            }
        }
    }

    println!("{}", Table::new(&rows));
    if failed > 0 {
        output::print_warning(&format!("{} of {} files failed to parse", failed, rows.len()));
    }

    if let Some(output_csv) = &args.output_csv {
        save_summary_csv(&rows, output_csv)?;
        output::print_success(&format!("Summary saved to '{}'", output_csv.display()));
    }

    output::print_done(&format!(
        "Parsed {} files ({} ok, {} failed)",
        rows.len(),
        rows.len() - failed,
        failed
    ));
    Ok(())
}

/// 解析单个日志为汇总记录（并行执行体）
fn summarize_log(path: &Path) -> Result<LogSummary> {
    let frozen = match find_parent_com_file(path) {
        Some(com_path) => parse_com_file(&com_path)?.frozen_atom_coordinates,
        None => Vec::new(),
    };
    let frozen = if frozen.is_empty() { None } else { Some(frozen.as_slice()) };
    let log = parse_log_file(path, frozen)?;
    Ok(LogSummary {
        jobs: log.jobs.iter().map(job_label).collect(),
        final_energy: log.jobs.last().and_then(final_energy),
        normal_termination: log.normal_termination,
        has_afir_path: log.afir_path.is_some(),
    })
}

/// 作业的终态能量（无可用能量记录时为 `None`）
fn final_energy(job: &Job) -> Option<Decimal> {
    match job {
        Job::Opt(j) => j
            .optimized
            .as_ref()
            .map(|o| o.energy)
            .or_else(|| j.last_iteration().map(|it| it.energy)),
        Job::Freq(j) => j.thermal_data.first().map(|t| t.e_el),
        Job::Irc(j) => j.profile.last().map(|p| p.energy),
        Job::Lup(j) => j.iterations.last().and_then(|it| {
            it.profile
                .last()
                .map(|p| p.energy)
                .or_else(|| it.nodes.last().map(|n| n.energy))
        }),
    }
}

fn job_label(job: &Job) -> String {
    match job {
        Job::Opt(j) => format!("OPT({})", j.status),
        Job::Freq(j) => format!("FREQ({} im)", j.num_imaginary()),
        Job::Irc(j) => format!("IRC({} paths)", j.paths.len()),
        Job::Lup(j) => format!("LUP({} itr)", j.iterations.len()),
    }
}

fn save_summary_csv(rows: &[SummaryRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["file", "jobs", "final_energy", "termination", "afir", "note"])?;
    for row in rows {
        writer.write_record([
            row.file.as_str(),
            row.jobs.as_str(),
            row.final_energy.as_str(),
            row.termination.as_str(),
            row.afir.as_str(),
            row.note.as_str(),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
