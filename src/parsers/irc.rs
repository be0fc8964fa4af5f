//! # 反应路径 (IRC) 块解析器
//!
//! 解析一个 IRC 块：
//! - 初始结构: 唯一的 "INITIAL STRUCTURE" 行到下一条 "ENERGY" 行；
//!   出现第二条 INITIAL STRUCTURE 是日志一致性错误
//! - 路径段: 在五种跟踪句首（IRC/SOFTEST 前后向、非驻点最速下降）处切分；
//!   首个句首之前的片段作为初始频率子块处理
//! - 每段内 "# STEP" 行开启一个 (结构, 能量, 自旋²) 步点，
//!   段尾可内嵌 OPT/FREQ 精修子作业
//! - "Energy profile along IRC" 之后为长度-能量剖面
//!
//! ## 依赖关系
//! - 被 `parsers/log.rs`, `parsers/lup.rs` 调用
//! - 使用 `parsers/opt.rs`, `parsers/freq.rs`, `models/irc.rs`

use crate::error::{GrrmKitError, Result};
use crate::models::irc::{FollowingMode, IrcJob, IrcPath, IrcStep, PathDirection, ProfilePoint};
use crate::models::structure::{AtomCoord, Structure};
use crate::models::JobKind;
use crate::parsers::opt::{parse_opt_block, slice_structure};
use crate::parsers::freq::parse_freq_block;
use crate::parsers::{extract_sub_block, line_at, parse_decimal, IRC_MARKER};

/// 剖面行中作为能量读取的列号（0 起）
///
/// SC-AFIR 变体的剖面每行可能超过两列数值，其余列的含义未定；
/// 沿用"第二列是能量"的既有解释。
pub const PROFILE_ENERGY_COLUMN: usize = 1;

/// 路径段句首 -> (跟踪模式, 方向)
const PATH_SENTINELS: [(&str, FollowingMode, PathDirection); 5] = [
    (
        "IRC FOLLOWING (FORWARD) STARTING FROM",
        FollowingMode::Irc,
        PathDirection::Forward,
    ),
    (
        "IRC FOLLOWING (BACKWARD) STARTING FROM",
        FollowingMode::Irc,
        PathDirection::Backward,
    ),
    (
        "SOFTEST MODE FOLLOWING (FORWARD) STARTING FROM",
        FollowingMode::Softest,
        PathDirection::Forward,
    ),
    (
        "SOFTEST MODE FOLLOWING (BACKWARD) STARTING FROM",
        FollowingMode::Softest,
        PathDirection::Backward,
    ),
    (
        "STEEPEST-DESCENT PATH FOLLOWING STARTING FROM NON-STATIONARY POINT",
        FollowingMode::Nsp,
        PathDirection::Forward,
    ),
];

fn path_sentinel(line: &str) -> Option<(FollowingMode, PathDirection)> {
    PATH_SENTINELS
        .iter()
        .find(|(prefix, _, _)| line.starts_with(prefix))
        .map(|(_, mode, direction)| (*mode, *direction))
}

/// 解析 IRC 作业块
pub fn parse_irc_block<S: AsRef<str>>(
    lines: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<IrcJob> {
    if lines.is_empty() || !lines[0].as_ref().starts_with(IRC_MARKER) {
        return Err(GrrmKitError::Consistency(
            "IRC block does not start with an IRC marker line".to_string(),
        ));
    }

    let init_structure = read_initial_structure(lines, frozen_atoms)?;
    let num_atom = init_structure.num_atom();

    // 路径切分（剖面段落之前）
    let segments = split_path_segments(lines);

    // 首段（句首之前）: 初始频率子块
    let mut init_freq_job = None;
    if let Some(head) = segments.head {
        if let Some(freq_block) = extract_sub_block(head, JobKind::Freq) {
            init_freq_job = Some(parse_freq_block(freq_block, frozen_atoms)?);
        }
    }

    let mut paths = Vec::new();
    for segment in segments.paths {
        paths.push(parse_path_segment(segment, num_atom, frozen_atoms)?);
    }

    let profile = read_energy_profile(lines)?;

    Ok(IrcJob {
        name: None,
        num_atom,
        init_structure,
        init_freq_job,
        paths,
        profile,
    })
}

fn read_initial_structure<S: AsRef<str>>(
    lines: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<Structure> {
    let mut start = None;
    let mut end = None;
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.starts_with("INITIAL STRUCTURE") {
            if start.is_some() {
                return Err(GrrmKitError::Consistency(
                    "more than one INITIAL STRUCTURE in one IRC block".to_string(),
                ));
            }
            start = Some(i + 1);
        }
        if line.starts_with("ENERGY") && start.is_some() && end.is_none() {
            end = Some(i);
            break;
        }
    }
    match (start, end) {
        (Some(start), Some(end)) => Structure::from_lines(
            &lines[start..end],
            Some("Initial Structure"),
            frozen_atoms,
        ),
        _ => Err(GrrmKitError::format(
            "IRC block (no initial structure)",
            lines[0].as_ref().trim(),
        )),
    }
}

struct PathSegments<'a, S> {
    /// 首个路径句首之前的片段
    head: Option<&'a [S]>,
    /// 各路径段（含句首行），剖面段落之前
    paths: Vec<&'a [S]>,
}

fn split_path_segments<S: AsRef<str>>(lines: &[S]) -> PathSegments<'_, S> {
    let mut limit = lines.len();
    let mut starts = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.starts_with("Energy profile along IRC") {
            limit = i;
            break;
        }
        if path_sentinel(line).is_some() {
            starts.push(i);
        }
    }

    match starts.first() {
        None => PathSegments {
            head: Some(&lines[..limit]),
            paths: Vec::new(),
        },
        Some(&first) => {
            let mut paths = Vec::new();
            for (n, &start) in starts.iter().enumerate() {
                let end = starts.get(n + 1).copied().unwrap_or(limit);
                paths.push(&lines[start..end]);
            }
            PathSegments {
                head: if first > 0 { Some(&lines[..first]) } else { None },
                paths,
            }
        }
    }
}

fn parse_path_segment<S: AsRef<str>>(
    segment: &[S],
    num_atom: usize,
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<IrcPath> {
    let first = segment[0].as_ref();
    let (mode, direction) = path_sentinel(first)
        .ok_or_else(|| GrrmKitError::format("IRC path sentinel", first.trim()))?;

    let mut steps = Vec::new();
    for (i, line) in segment.iter().enumerate() {
        let line = line.as_ref();
        if line.starts_with("# STEP") {
            let name = line.trim().to_string();
            let structure = slice_structure(segment, i + 1, num_atom, Some(&name), frozen_atoms)?;
            let energy = value_after_equals(segment, i + 1 + num_atom, "ENERGY")?;
            let spin2 = value_after_equals(segment, i + 2 + num_atom, "SPIN")?;
            steps.push(IrcStep {
                structure,
                energy,
                spin2,
            });
        }
    }

    // 路径终点的精修子作业
    let opt_job = match extract_sub_block(segment, JobKind::Opt) {
        Some(block) => Some(parse_opt_block(block, frozen_atoms)?),
        None => None,
    };
    let freq_job = match extract_sub_block(segment, JobKind::Freq) {
        Some(block) => Some(parse_freq_block(block, frozen_atoms)?),
        None => None,
    };

    Ok(IrcPath {
        mode,
        direction,
        steps,
        opt_job,
        freq_job,
    })
}

/// 校验标签后取 "=" 之后的首个数值
fn value_after_equals<S: AsRef<str>>(
    lines: &[S],
    idx: usize,
    label: &str,
) -> Result<rust_decimal::Decimal> {
    let line = line_at(lines, idx, label)?;
    if !line.to_uppercase().contains(label) {
        return Err(GrrmKitError::format(format!("{} line", label), line.trim()));
    }
    let value = line
        .splitn(2, '=')
        .nth(1)
        .and_then(|after| after.split_whitespace().next())
        .ok_or_else(|| GrrmKitError::format(format!("{} line", label), line.trim()))?;
    parse_decimal(value, line)
}

/// 读取 "Energy profile along IRC" 之后的剖面
///
/// 标题行 + 1 行表头之后逐行读取，空行或 "Reverse" 行结束。
fn read_energy_profile<S: AsRef<str>>(lines: &[S]) -> Result<Vec<ProfilePoint>> {
    let mut start = None;
    for (i, line) in lines.iter().enumerate() {
        if line.as_ref().starts_with("Energy profile along IRC") {
            start = Some(i + 2);
        }
    }
    let start = match start {
        Some(s) => s,
        None => return Ok(Vec::new()),
    };

    let mut points = Vec::new();
    for line in lines[start.min(lines.len())..].iter() {
        let line = line.as_ref();
        if line.trim().is_empty() || line.starts_with("Reverse") {
            break;
        }
        let terms: Vec<&str> = line.split_whitespace().collect();
        if terms.len() < 2 {
            return Err(GrrmKitError::format("IRC profile line", line.trim()));
        }
        let length = parse_decimal(terms[0], line)?;
        let energy = parse_decimal(terms[PROFILE_ENERGY_COLUMN], line)?;
        points.push(ProfilePoint { length, energy });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{FREQ_MARKER, OPT_MARKER};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn step_block(n: usize, energy: &str) -> String {
        format!(
            "# STEP {n}\n\
             C     0.000000000000   0.000000000000   {z:.12}\n\
             O     1.200000000000   0.000000000000   0.000000000000\n\
             ENERGY    =  {e}  (  0.000000000000 :  0.000000000000 )\n\
             Spin(**2) =   0.000000000000\n",
            n = n,
            z = n as f64 * 0.1,
            e = energy
        )
    }

    fn initial_structure() -> &'static str {
        "INITIAL STRUCTURE\n\
         C     0.000000000000   0.000000000000   0.000000000000\n\
         O     1.200000000000   0.000000000000   0.000000000000\n\
         ENERGY    =  -113.000000000000\n"
    }

    fn to_lines(text: String) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_forward_backward_paths_with_profile() {
        let text = format!(
            "{m}\n{init}\
             IRC FOLLOWING (FORWARD) STARTING FROM FIRST-POINT\n{s1}{s2}\
             IRC FOLLOWING (BACKWARD) STARTING FROM FIRST-POINT\n{s3}\
             Energy profile along IRC\n\
             # LENGTH  ENERGY\n\
             0.100000  -113.100000000000\n\
             0.200000  -113.200000000000\n\
             \n{m}\n",
            m = IRC_MARKER,
            init = initial_structure(),
            s1 = step_block(1, "-113.100000000000"),
            s2 = step_block(2, "-113.150000000000"),
            s3 = step_block(1, "-113.050000000000"),
        );
        let job = parse_irc_block(&to_lines(text), None).unwrap();

        assert_eq!(job.num_atom, 2);
        assert_eq!(job.paths.len(), 2);
        assert_eq!(job.paths[0].direction, PathDirection::Forward);
        assert_eq!(job.paths[0].mode, FollowingMode::Irc);
        assert_eq!(job.paths[0].steps.len(), 2);
        assert_eq!(job.paths[1].direction, PathDirection::Backward);
        assert_eq!(
            job.paths[0].steps[0].energy,
            Decimal::from_str("-113.1").unwrap()
        );
        assert_eq!(job.profile.len(), 2);
        assert_eq!(
            job.profile[1].energy,
            Decimal::from_str("-113.2").unwrap()
        );

        let (forward, backward) = job.forward_backward_pair().unwrap();
        assert_eq!(forward.direction, PathDirection::Forward);
        assert_eq!(backward.direction, PathDirection::Backward);
    }

    #[test]
    fn test_duplicate_initial_structure_is_inconsistent() {
        let text = format!(
            "{m}\nINITIAL STRUCTURE\nINITIAL STRUCTURE\nENERGY = -1.0\n{m}\n",
            m = IRC_MARKER
        );
        assert!(matches!(
            parse_irc_block(&to_lines(text), None),
            Err(GrrmKitError::Consistency(_))
        ));
    }

    #[test]
    fn test_single_path_cannot_pair() {
        let text = format!(
            "{m}\n{init}\
             IRC FOLLOWING (FORWARD) STARTING FROM FIRST-POINT\n{s}{m}\n",
            m = IRC_MARKER,
            init = initial_structure(),
            s = step_block(1, "-113.100000000000"),
        );
        let job = parse_irc_block(&to_lines(text), None).unwrap();
        assert_eq!(job.paths.len(), 1);
        assert!(job.forward_backward_pair().is_err());
        assert!(job.profile.is_empty());
    }

    #[test]
    fn test_softest_mode_sentinel() {
        let text = format!(
            "{m}\n{init}\
             SOFTEST MODE FOLLOWING (BACKWARD) STARTING FROM EQ\n{s}{m}\n",
            m = IRC_MARKER,
            init = initial_structure(),
            s = step_block(1, "-113.000000000000"),
        );
        let job = parse_irc_block(&to_lines(text), None).unwrap();
        assert_eq!(job.paths[0].mode, FollowingMode::Softest);
        assert_eq!(job.paths[0].direction, PathDirection::Backward);
    }

    #[test]
    fn test_embedded_refinement_jobs_in_path() {
        // 路径段尾内嵌闭合 OPT 子块; 未闭合 FREQ 子块被忽略
        let opt_inner = "\
             # ITR. 0\n\
             C     0.000000000000   0.000000000000   0.000000000000\n\
             O     1.200000000000   0.000000000000   0.000000000000\n\
             \x20  Item   Value   Threshold\n\
             ENERGY    -113.200000000000\n\
             Spin(**2)     0.000000000000\n\
             LAMDA         0.000000000000\n\
             TRUST RADII   0.100000000000\n\
             STEP RADII    0.050000000000\n\
             MAXIMUM  FORCE        0.000100000000   0.000300000000\n\
             RMS      FORCE        0.000100000000   0.000200000000\n\
             MAXIMUM  DISPLACEMENT 0.000400000000   0.001500000000\n\
             RMS      DISPLACEMENT 0.000200000000   0.001000000000\n";
        let text = format!(
            "{m}\n{init}\
             IRC FOLLOWING (FORWARD) STARTING FROM FIRST-POINT\n{s}\
             {o}\n{opt_inner}{o}\n\
             {f}\nunfinished freq data\n\
             {m}\n",
            m = IRC_MARKER,
            init = initial_structure(),
            s = step_block(1, "-113.100000000000"),
            o = OPT_MARKER,
            f = FREQ_MARKER,
            opt_inner = opt_inner,
        );
        let job = parse_irc_block(&to_lines(text), None).unwrap();
        let path = &job.paths[0];
        assert!(path.opt_job.is_some());
        assert_eq!(path.opt_job.as_ref().unwrap().iterations.len(), 1);
        // 单个未闭合 FREQ 分隔行: 不产出子作业
        assert!(path.freq_job.is_none());
    }
}
