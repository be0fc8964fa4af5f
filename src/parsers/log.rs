//! # GRRM 日志顶层解析器
//!
//! 整份日志的装配流程：
//! 1. 扫描正常终止标志
//! 2. 块切分状态机切出顶层作业序列，逐块分派到各作业解析器
//! 3. 两遍处理 ">>Start" 重启行，为对应的 AppEQ 再优化作业命名
//! 4. 定位末尾的 AFIR 路径总结段落
//!
//! ## 依赖关系
//! - 被 `commands/` 各命令调用
//! - 使用 `parsers/{opt,freq,irc,lup,afir}.rs`, `models/job.rs`

use std::fs;
use std::path::Path;

use crate::error::{GrrmKitError, Result};
use crate::models::job::{GrrmLog, Job};
use crate::models::structure::AtomCoord;
use crate::models::JobKind;
use crate::parsers::afir::parse_afir_path;
use crate::parsers::freq::parse_freq_block;
use crate::parsers::irc::parse_irc_block;
use crate::parsers::lup::parse_lup_block;
use crate::parsers::opt::parse_opt_block;
use crate::parsers::split_job_blocks;

const NORMAL_TERMINATION: &str = "Normal termination of the GRRM Program";

/// 解析整份日志文本
pub fn parse_log_lines<S: AsRef<str>>(
    lines: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<GrrmLog> {
    let normal_termination = lines
        .iter()
        .any(|line| line.as_ref().starts_with(NORMAL_TERMINATION));

    let blocks = split_job_blocks(lines);
    let mut jobs = Vec::with_capacity(blocks.len());
    let mut spans = Vec::with_capacity(blocks.len());
    for block in &blocks {
        let job = match block.kind {
            JobKind::Opt => Job::Opt(parse_opt_block(&block.lines, frozen_atoms)?),
            JobKind::Freq => Job::Freq(parse_freq_block(&block.lines, frozen_atoms)?),
            JobKind::Irc => Job::Irc(parse_irc_block(&block.lines, frozen_atoms)?),
            JobKind::Lup => Job::Lup(parse_lup_block(&block.lines, frozen_atoms)?),
        };
        spans.push((block.start, block.end));
        jobs.push(job);
    }

    apply_restart_names(lines, &spans, &mut jobs);

    let afir_path = match lines
        .iter()
        .position(|line| line.as_ref().starts_with("---Profile of AFIR path"))
    {
        Some(start) => Some(parse_afir_path(&lines[start..], frozen_atoms)?),
        None => None,
    };

    Ok(GrrmLog {
        jobs,
        normal_termination,
        afir_path,
    })
}

/// 读取并解析日志文件
pub fn parse_log_file(path: &Path, frozen_atoms: Option<&[AtomCoord]>) -> Result<GrrmLog> {
    let text = fs::read_to_string(path).map_err(|source| GrrmKitError::FileReadError {
        path: path.display().to_string(),
        source,
    })?;
    let lines: Vec<&str> = text.lines().collect();
    parse_log_lines(&lines, frozen_atoms)
}

/// ">>Start" / ">>>Start" 重启行命名
///
/// 重启行位于作业块之间，末字段给出再优化的目标（仅 AppEQ 目标有意义）。
/// 名称附到重启行之后的第一个作业块上。
fn apply_restart_names<S: AsRef<str>>(lines: &[S], spans: &[(usize, usize)], jobs: &mut [Job]) {
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if !(line.starts_with(">>") && line.contains("Start")) {
            continue;
        }
        let target = match line.split_whitespace().last() {
            Some(token) if token.contains("AppEQ") => token.to_string(),
            _ => continue,
        };
        if let Some(pos) = spans.iter().position(|&(_, end)| end > i) {
            if jobs[pos].name().is_none() {
                jobs[pos].set_name(Some(target));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::opt::OptStatus;
    use crate::parsers::OPT_MARKER;

    fn opt_block(energy: &str, tail: &str) -> String {
        format!(
            "{m}\n\
             # ITR. 0\n\
             C     0.000000000000   0.000000000000   0.000000000000\n\
             O     1.200000000000   0.000000000000   0.000000000000\n\
             \x20  Item   Value   Threshold\n\
             ENERGY    {e}\n\
             Spin(**2)     0.000000000000\n\
             LAMDA         0.000000000000\n\
             TRUST RADII   0.100000000000\n\
             STEP RADII    0.050000000000\n\
             MAXIMUM  FORCE        0.000100000000   0.000300000000\n\
             RMS      FORCE        0.000100000000   0.000200000000\n\
             MAXIMUM  DISPLACEMENT 0.000400000000   0.001500000000\n\
             RMS      DISPLACEMENT 0.000200000000   0.001000000000\n\
             {tail}{m}\n",
            m = OPT_MARKER,
            e = energy,
            tail = tail,
        )
    }

    fn optimized_tail(energy: &str) -> String {
        format!(
            "Optimized structure\n\
             C     0.000000000000   0.000000000000   0.000000000000\n\
             O     1.200000000000   0.000000000000   0.000000000000\n\
             ENERGY    =  {e}\n\
             Spin(**2) =   0.000000000000\n\
             Minimum point was found.\n",
            e = energy
        )
    }

    fn to_lines(text: String) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_sequence_and_termination() {
        let text = format!(
            "preamble line\n{a}{b}{term}\n",
            a = opt_block("-113.000000000000", &optimized_tail("-113.100000000000")),
            b = opt_block("-112.000000000000", ""),
            term = NORMAL_TERMINATION,
        );
        let log = parse_log_lines(&to_lines(text), None).unwrap();

        assert!(log.normal_termination);
        assert!(log.afir_path.is_none());
        assert_eq!(log.jobs.len(), 2);
        match &log.jobs[0] {
            Job::Opt(job) => {
                assert_eq!(job.status, OptStatus::MinFound);
                assert_eq!(job.num_atom, 2);
            }
            other => panic!("expected OPT job, got {}", other.kind()),
        }
        match &log.jobs[1] {
            Job::Opt(job) => assert_eq!(job.status, OptStatus::NotConverged),
            other => panic!("expected OPT job, got {}", other.kind()),
        }
    }

    #[test]
    fn test_missing_termination_flag() {
        let text = opt_block("-113.000000000000", "");
        let log = parse_log_lines(&to_lines(text), None).unwrap();
        assert!(!log.normal_termination);
        assert_eq!(log.jobs.len(), 1);
    }

    #[test]
    fn test_restart_names_attach_to_following_block() {
        let text = format!(
            ">>Start re-calculation from AppEQ0.log\n{a}\
             >>Start re-calculation from AppEQ1.log\n{b}",
            a = opt_block("-1.000000000000", &optimized_tail("-1.100000000000")),
            b = opt_block("-2.000000000000", &optimized_tail("-2.100000000000")),
        );
        let log = parse_log_lines(&to_lines(text), None).unwrap();
        assert_eq!(log.jobs.len(), 2);
        assert_eq!(log.jobs[0].name(), Some("AppEQ0.log"));
        assert_eq!(log.jobs[1].name(), Some("AppEQ1.log"));
    }

    #[test]
    fn test_restart_line_without_app_eq_target_is_ignored() {
        let text = format!(
            ">>Start re-calculation from scratch\n{a}",
            a = opt_block("-1.000000000000", &optimized_tail("-1.100000000000")),
        );
        let log = parse_log_lines(&to_lines(text), None).unwrap();
        assert_eq!(log.jobs[0].name(), None);
    }

    #[test]
    fn test_afir_section_is_parsed() {
        let text = format!(
            "{opt}\
             ---Profile of AFIR path---\n\
             # ITR.   LENGTH    ENERGY\n\
             0   0.000000   -10.000000000000\n\
             1   0.500000   -10.100000000000\n\
             \n",
            opt = opt_block("-113.000000000000", &optimized_tail("-113.100000000000")),
        );
        let log = parse_log_lines(&to_lines(text), None).unwrap();
        let afir = log.afir_path.unwrap();
        assert_eq!(afir.points.len(), 2);
    }
}
