//! # analyze 命令实现
//!
//! 单个 GRRM 日志的作业摘要：作业序列表、OPT 收敛明细、
//! FREQ 模式统计与可选的热化学表、AFIR 路径概览。
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的参数
//! - 使用 `parsers/`, `models/`
//! - 使用 `utils/output.rs`, `tabled`

use tabled::{Table, Tabled};

use crate::cli::analyze::AnalyzeArgs;
use crate::error::Result;
use crate::models::{fixed12, FreqJob, Job, OptJob};
use crate::utils::output;

/// 作业序列表行
#[derive(Debug, Clone, Tabled)]
struct JobRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Atoms")]
    atoms: usize,
    #[tabled(rename = "Summary")]
    summary: String,
}

/// 执行 analyze 命令
pub fn execute(args: AnalyzeArgs) -> Result<()> {
    output::print_header(&format!("GRRM Log: {}", args.log_file.display()));

    let (log, com) = super::load_log(&args.log_file, args.com_file.as_deref())?;
    super::report_termination(&log);

    if let Some(com) = &com {
        output::print_info(&format!(
            "Input: {} (charge {}, multiplicity {}, {} frozen atoms)",
            com.method,
            com.charge,
            com.multi,
            com.frozen_atom_coordinates.len()
        ));
        if !com.link_options.is_empty() {
            output::print_info(&format!("Link options: {}", com.link_options.join(", ")));
        }
        if !com.method_options.is_empty() {
            output::print_info(&format!("Options: {}", com.method_options.join(", ")));
        }
    }

    let rows: Vec<JobRow> = log
        .jobs
        .iter()
        .enumerate()
        .map(|(i, job)| JobRow {
            index: i,
            kind: job.kind().to_string(),
            name: job.name().unwrap_or("-").to_string(),
            atoms: job_atoms(job),
            summary: job_summary(job),
        })
        .collect();

    if rows.is_empty() {
        output::print_warning("No job blocks found in the log.");
    } else {
        println!("{}", Table::new(&rows));
    }

    for (i, job) in log.jobs.iter().enumerate() {
        match job {
            Job::Opt(opt) => print_opt_detail(i, opt),
            Job::Freq(freq) if args.thermal => print_thermal_tables(i, freq),
            _ => {}
        }
    }

    if let Some(afir) = &log.afir_path {
        output::print_separator();
        output::print_info(&format!(
            "AFIR path: {} profile points, {} approximate structures",
            afir.points.len(),
            afir.approximate_structures.len()
        ));
    }

    Ok(())
}

fn job_atoms(job: &Job) -> usize {
    match job {
        Job::Opt(j) => j.num_atom,
        Job::Freq(j) => j.num_atom,
        Job::Irc(j) => j.num_atom,
        Job::Lup(j) => j.num_atom,
    }
}

fn job_summary(job: &Job) -> String {
    match job {
        Job::Opt(j) => format!("{} iterations, {}", j.iterations.len(), j.status),
        Job::Freq(j) => format!(
            "{} modes ({} imaginary), {} thermal records",
            j.num_modes(),
            j.num_imaginary(),
            j.thermal_data.len()
        ),
        Job::Irc(j) => format!(
            "{} path segments, {} profile points",
            j.paths.len(),
            j.profile.len()
        ),
        Job::Lup(j) => format!(
            "{} iterations, {} approximate structures, {} sub-jobs",
            j.iterations.len(),
            j.approximate_structures.len(),
            j.sub_jobs.len()
        ),
    }
}

/// OPT 末次迭代的收敛明细表
fn print_opt_detail(index: usize, job: &OptJob) {
    let iteration = match job.last_iteration() {
        Some(it) => it,
        None => return,
    };

    #[derive(Tabled)]
    struct MetricRow {
        #[tabled(rename = "Item")]
        item: &'static str,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Threshold")]
        threshold: String,
        #[tabled(rename = "Converged")]
        converged: &'static str,
    }

    let m = &iteration.metrics;
    let row = |item, metric: &crate::models::MetricValue| MetricRow {
        item,
        value: fixed12(&metric.value),
        threshold: fixed12(&metric.threshold),
        converged: if metric.converged() { "yes" } else { "no" },
    };
    let rows = vec![
        row("Maximum Force", &m.maximum_force),
        row("RMS Force", &m.rms_force),
        row("Maximum Displacement", &m.maximum_displacement),
        row("RMS Displacement", &m.rms_displacement),
    ];

    output::print_header(&format!(
        "Job {} (OPT) - last iteration, E = {}{}",
        index,
        fixed12(&iteration.energy),
        if m.all_converged() { " (converged)" } else { "" }
    ));
    println!("{}", Table::new(&rows));
}

/// FREQ 作业的热化学表
fn print_thermal_tables(index: usize, job: &FreqJob) {
    #[derive(Tabled)]
    struct ThermalRow {
        #[tabled(rename = "Item")]
        item: &'static str,
        #[tabled(rename = "Value (a.u.)")]
        value: String,
    }

    for thermal in &job.thermal_data {
        output::print_header(&format!("Job {} (FREQ) - {}", index, thermal.header));
        let rows = vec![
            ThermalRow { item: "E(el)", value: fixed12(&thermal.e_el) },
            ThermalRow { item: "ZPVE", value: fixed12(&thermal.zpve) },
            ThermalRow { item: "Enthalpie(0K)", value: fixed12(&thermal.h_zero) },
            ThermalRow { item: "E(tr)", value: fixed12(&thermal.e_tr) },
            ThermalRow { item: "E(rot)", value: fixed12(&thermal.e_rot) },
            ThermalRow { item: "E(vib)", value: fixed12(&thermal.e_vib) },
            ThermalRow { item: "H-E(el)", value: fixed12(&thermal.h_corr) },
            ThermalRow { item: "Enthalpie", value: fixed12(&thermal.h) },
            ThermalRow { item: "S(el)", value: fixed12(&thermal.s_el) },
            ThermalRow { item: "S(tr)", value: fixed12(&thermal.s_tr) },
            ThermalRow { item: "S(rot)", value: fixed12(&thermal.s_rot) },
            ThermalRow { item: "S(vib)", value: fixed12(&thermal.s_vib) },
            ThermalRow { item: "G-E(el)", value: fixed12(&thermal.g_corr) },
            ThermalRow { item: "Free Energy", value: fixed12(&thermal.g) },
        ];
        println!("{}", Table::new(&rows));
    }
}
