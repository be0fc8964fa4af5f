//! # LUP 路径优化块解析器
//!
//! 解析一个 LUP 块：
//! - 迭代锚点: "ITR. n ... of LUP-path optimization" 行；相邻锚点之间
//!   为一次路径迭代，末段以横线分隔行或 "---Approximate" 行截断
//! - 每次迭代: "# NODE" 结构序列 + "---Profile of LUP path" 剖面
//! - 全块范围两遍扫描 "---Approximate" 行收集近似 TS/EQ 结构
//! - "# Geometry of App..." 锚点划分子作业组，组内复用顶层块切分
//!   状态机产出命名的 opt/freq/irc 精修子作业
//!
//! ## 依赖关系
//! - 被 `parsers/log.rs` 调用
//! - 使用 `parsers/{opt,freq,irc}.rs`, `models/lup.rs`

use crate::error::{GrrmKitError, Result};
use crate::models::lup::{
    ApproximateKind, ApproximateStructure, LupJob, LupNode, LupPath, LupProfilePoint,
};
use crate::models::structure::{AtomCoord, Structure};
use crate::models::{Job, JobKind};
use crate::parsers::freq::parse_freq_block;
use crate::parsers::irc::parse_irc_block;
use crate::parsers::opt::{parse_opt_block, slice_structure};
use crate::parsers::{line_at, parse_decimal, split_job_blocks, LUP_MARKER};

/// 解析 LUP 作业块
pub fn parse_lup_block<S: AsRef<str>>(
    lines: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<LupJob> {
    if lines.is_empty() || !lines[0].as_ref().starts_with(LUP_MARKER) {
        return Err(GrrmKitError::Consistency(
            "LUP block does not start with a LUP marker line".to_string(),
        ));
    }

    let iterations = read_iterations(lines, frozen_atoms)?;
    let num_atom = iterations.first().map(|p| p.num_atom).unwrap_or(0);

    if iterations.is_empty() {
        // 中断过早的作业: 无迭代则不可能有近似结构或子作业
        return Ok(LupJob {
            name: None,
            num_atom: 0,
            iterations,
            approximate_structures: Vec::new(),
            sub_jobs: Vec::new(),
        });
    }

    let approximate_structures = read_approximate_structures(lines, num_atom, frozen_atoms)?;
    let sub_jobs = read_sub_jobs(lines, frozen_atoms)?;

    Ok(LupJob {
        name: None,
        num_atom,
        iterations,
        approximate_structures,
        sub_jobs,
    })
}

fn is_iteration_anchor(line: &str) -> bool {
    line.starts_with("ITR.") && line.contains("of LUP-path optimization")
}

fn read_iterations<S: AsRef<str>>(
    lines: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<Vec<LupPath>> {
    let anchors: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_iteration_anchor(line.as_ref()))
        .map(|(i, _)| i)
        .collect();

    let mut iterations = Vec::new();
    for (n, &start) in anchors.iter().enumerate() {
        let segment = match anchors.get(n + 1) {
            Some(&next) => &lines[start..next],
            None => match close_last_iteration(lines, start) {
                // 末段未闭合则丢弃（迭代进行到一半时作业被中断）
                None => continue,
                Some(end) => &lines[start..end],
            },
        };
        iterations.push(parse_iteration(segment, frozen_atoms)?);
    }
    Ok(iterations)
}

/// 末次迭代的闭合位置: 横线分隔行或首个近似结构行
fn close_last_iteration<S: AsRef<str>>(lines: &[S], start: usize) -> Option<usize> {
    lines[start..]
        .iter()
        .position(|line| {
            let line = line.as_ref();
            line.starts_with("-------------------------------------")
                || line.starts_with("---Approximate")
        })
        .map(|offset| start + offset)
}

fn parse_iteration<S: AsRef<str>>(
    segment: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<LupPath> {
    let anchor = segment[0].as_ref();
    let name = anchor
        .split("of")
        .next()
        .unwrap_or(anchor)
        .trim()
        .to_string();

    // 首个 NODE 行到其 ENERGY 行的间距给出原子数
    let first_node = segment
        .iter()
        .position(|line| line.as_ref().starts_with("# NODE"))
        .ok_or_else(|| GrrmKitError::format("LUP iteration (no # NODE)", anchor.trim()))?;
    let num_atom = segment[first_node..]
        .iter()
        .position(|line| line.as_ref().starts_with("ENERGY"))
        .ok_or_else(|| GrrmKitError::format("LUP node (no ENERGY)", anchor.trim()))?
        - 1;

    // 剖面表头同样以 "# NODE" 开头，节点扫描止于剖面标题行
    let profile_header = segment
        .iter()
        .position(|line| line.as_ref().starts_with("---Profile of LUP path"))
        .ok_or_else(|| {
            GrrmKitError::format("LUP iteration (no path profile)", anchor.trim())
        })?;

    let mut nodes = Vec::new();
    for (i, line) in segment[..profile_header].iter().enumerate() {
        let line = line.as_ref();
        if line.starts_with("# NODE") {
            let node_name = line.trim().to_string();
            let structure =
                slice_structure(segment, i + 1, num_atom, Some(&node_name), frozen_atoms)?;
            let energy_line = line_at(segment, i + 1 + num_atom, "ENERGY")?;
            if !energy_line.to_uppercase().contains("ENERGY") {
                return Err(GrrmKitError::format("ENERGY line", energy_line.trim()));
            }
            let energy_token = energy_line
                .split_whitespace()
                .last()
                .ok_or_else(|| GrrmKitError::format("ENERGY line", energy_line.trim()))?;
            let energy = parse_decimal(energy_token, energy_line)?;
            nodes.push(LupNode { structure, energy });
        }
    }

    let profile = read_iteration_profile(segment)?;

    Ok(LupPath {
        name,
        num_atom,
        nodes,
        profile,
    })
}

fn read_iteration_profile<S: AsRef<str>>(segment: &[S]) -> Result<Vec<LupProfilePoint>> {
    let start = segment
        .iter()
        .position(|line| line.as_ref().starts_with("---Profile of LUP path"))
        .ok_or_else(|| {
            GrrmKitError::format(
                "LUP iteration (no path profile)",
                segment[0].as_ref().trim(),
            )
        })?
        + 2;

    let mut points = Vec::new();
    for line in segment[start.min(segment.len())..].iter() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            break;
        }
        let terms: Vec<&str> = line.split_whitespace().collect();
        if terms.len() < 3 {
            return Err(GrrmKitError::format("LUP profile line", line.trim()));
        }
        let node: usize = terms[0]
            .parse()
            .map_err(|_| GrrmKitError::format("LUP profile line", line.trim()))?;
        points.push(LupProfilePoint {
            node,
            length: parse_decimal(terms[1], line)?,
            energy: parse_decimal(terms[2], line)?,
        });
    }
    Ok(points)
}

// ─────────────────────────────────────────────────────────────
// 近似 TS/EQ 结构与精修子作业
// ─────────────────────────────────────────────────────────────

fn read_approximate_structures<S: AsRef<str>>(
    lines: &[S],
    num_atom: usize,
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<Vec<ApproximateStructure>> {
    let mut out = Vec::new();
    let mut ts_count = 0usize;
    let mut eq_count = 0usize;

    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if !line.starts_with("---Approximate") {
            continue;
        }
        let kind_token = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| GrrmKitError::format("approximate structure line", line.trim()))?;
        let (kind, index) = match kind_token {
            "TS" => {
                ts_count += 1;
                (ApproximateKind::Ts, ts_count - 1)
            }
            "EQ" => {
                eq_count += 1;
                (ApproximateKind::Eq, eq_count - 1)
            }
            _ => {
                return Err(GrrmKitError::format(
                    "approximate structure line",
                    line.trim(),
                ))
            }
        };
        let name = format!(
            "{} : App{} {}",
            line.replace("---", "").replace(" geometry ", " ").trim(),
            kind,
            index
        );
        let structure = slice_structure(lines, i + 1, num_atom, Some(&name), frozen_atoms)?;
        let energy_line = line_at(lines, i + 1 + num_atom, "ENERGY")?;
        let energy_token = energy_line
            .split_whitespace()
            .nth(2)
            .ok_or_else(|| GrrmKitError::format("ENERGY line", energy_line.trim()))?;
        let energy = parse_decimal(energy_token, energy_line)?;
        out.push(ApproximateStructure {
            kind,
            index,
            structure,
            energy,
        });
    }
    Ok(out)
}

/// 精修子作业组: "# Geometry of AppTS/AppEQ n, ..." 锚点之间各跑一遍
/// 块切分状态机；无锚点时回退到最后一个近似结构之后的整段
fn read_sub_jobs<S: AsRef<str>>(
    lines: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<Vec<Job>> {
    let anchors: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.as_ref().starts_with("# Geometry of App"))
        .map(|(i, _)| i)
        .collect();

    let mut jobs = Vec::new();
    if anchors.is_empty() {
        // 旧格式: 子作业直接跟在近似结构之后，无几何锚点
        let last_approx = lines
            .iter()
            .rposition(|line| line.as_ref().starts_with("---Approximate"));
        let start = match last_approx {
            Some(i) => i,
            None => return Ok(jobs),
        };
        for (n, block) in split_job_blocks(&lines[start..]).into_iter().enumerate() {
            if let Some(mut job) = dispatch_sub_job(&block.lines, block.kind, frozen_atoms)? {
                job.set_name(Some(format!("sub#.{}", n + 1)));
                jobs.push(job);
            }
        }
        return Ok(jobs);
    }

    for (n, &start) in anchors.iter().enumerate() {
        let end = anchors.get(n + 1).copied().unwrap_or(lines.len());
        let anchor = lines[start].as_ref();
        let terms: Vec<&str> = anchor.split_whitespace().collect();
        let group_name = terms
            .get(3..5)
            .map(|t| t.join(" "))
            .unwrap_or_default()
            .trim_end_matches(',')
            .to_string();
        for block in split_job_blocks(&lines[start..end]) {
            if let Some(mut job) = dispatch_sub_job(&block.lines, block.kind, frozen_atoms)? {
                job.set_name(Some(group_name.clone()));
                jobs.push(job);
            }
        }
    }
    Ok(jobs)
}

fn dispatch_sub_job(
    block: &[String],
    kind: JobKind,
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<Option<Job>> {
    Ok(match kind {
        JobKind::Opt => Some(Job::Opt(parse_opt_block(block, frozen_atoms)?)),
        JobKind::Freq => Some(Job::Freq(parse_freq_block(block, frozen_atoms)?)),
        JobKind::Irc => Some(Job::Irc(parse_irc_block(block, frozen_atoms)?)),
        // LUP 块不会嵌套 LUP 子作业
        JobKind::Lup => None,
    })
}
