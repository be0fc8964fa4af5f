//! # 几何优化块解析器
//!
//! 解析一个有界 OPT 块：逐迭代的结构/能量/收敛指标、
//! 收敛结构快照和终止哨兵行。
//!
//! ## 块布局 (相对每个 "# ITR. n" 行)
//! ```text
//! # ITR. n
//! <num_atom 行坐标>
//! Item            Value      Threshold
//! ENERGY     E (e1 : e2)        # (e1 : e2) 仅 GRRM23
//! Spin(**2)  S
//! LAMDA      L
//! TRUST RADII      T
//! STEP  RADII      R
//! MAXIMUM FORCE        v  th
//! RMS     FORCE        v  th
//! MAXIMUM DISPLACEMENT v  th
//! RMS     DISPLACEMENT v  th
//! ```
//! 原子数由 "# ITR. 0" 行到 Item/Value/Threshold 表头行的行距确定。
//!
//! ## 依赖关系
//! - 被 `parsers/log.rs`, `parsers/irc.rs`, `parsers/lup.rs` 调用
//! - 使用 `models/opt.rs`

use crate::error::{GrrmKitError, Result};
use crate::models::opt::{
    ConvergenceMetrics, EnergyDecomposition, MetricValue, OptIteration, OptJob, OptStatus,
    OptimizedPoint,
};
use crate::models::structure::{AtomCoord, Structure};
use crate::parsers::{labeled_token, line_at, parse_decimal, OPT_MARKER};

/// 解析 OPT 作业块
///
/// `lines[0]` 必须是 OPT 分隔行。块可以未闭合（运行中的作业）。
pub fn parse_opt_block<S: AsRef<str>>(
    lines: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<OptJob> {
    if lines.is_empty() || !lines[0].as_ref().starts_with(OPT_MARKER) {
        return Err(GrrmKitError::Consistency(
            "OPT block does not start with an OPT marker line".to_string(),
        ));
    }

    let num_atom = find_num_atom(lines)?;

    let mut iterations = Vec::new();
    let mut optimized: Option<OptimizedPoint> = None;
    let mut status = OptStatus::Unfinished;

    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();

        if line.starts_with("# ITR. ") {
            iterations.push(parse_iteration(lines, i, num_atom, frozen_atoms)?);
        }

        if line.starts_with("Optimized structure") {
            if optimized.is_some() {
                return Err(GrrmKitError::Consistency(
                    "more than one optimized structure in one OPT block".to_string(),
                ));
            }
            optimized = Some(parse_optimized(lines, i, num_atom, frozen_atoms)?);
        }

        if line.starts_with("Minimum point was found") {
            require_optimized(&optimized, line)?;
            status = OptStatus::MinFound;
        }
        if line.starts_with("1st-Order Saddle point was found") {
            require_optimized(&optimized, line)?;
            status = OptStatus::SaddleFound;
        }
        if line.starts_with("Stationary point was found") {
            require_optimized(&optimized, line)?;
            status = OptStatus::StationaryFound;
        }
        if line.starts_with("The structure is dissociating") {
            status = OptStatus::Dissociate;
        }

        // 闭合分隔行: 无终止哨兵即视为未收敛
        if i > 0 && line.starts_with(OPT_MARKER) {
            if status == OptStatus::Unfinished {
                status = OptStatus::NotConverged;
            }
            break;
        }
    }

    Ok(OptJob {
        name: None,
        num_atom,
        iterations,
        optimized,
        status,
    })
}

/// 原子数 = "# ITR. 0" 行到 Item/Value/Threshold 表头行的行距 - 1
fn find_num_atom<S: AsRef<str>>(lines: &[S]) -> Result<usize> {
    let mut itr_zero = None;
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.starts_with("# ITR. 0") {
            itr_zero = Some(i);
        } else if line.contains("Item") && line.contains("Value") && line.contains("Threshold") {
            let start = itr_zero.ok_or_else(|| {
                GrrmKitError::format("OPT block (Item header before # ITR. 0)", line.trim())
            })?;
            return Ok(i - 1 - start);
        }
    }
    Err(GrrmKitError::format(
        "OPT block (no Item/Value/Threshold header)",
        lines[0].as_ref().trim(),
    ))
}

/// 迭代记录的定位字段表: (相对 "# ITR." 行的偏移, 期望标签, 字段下标)
///
/// 能量行单独处理（可选 (e1 : e2) 分解）。
const ITR_METRIC_FIELDS: [(usize, &[&str], usize); 4] = [
    (7, &["MAXIMUM", "FORCE"], 2),
    (8, &["RMS", "FORCE"], 2),
    (9, &["MAXIMUM", "DISPLACEMENT"], 2),
    (10, &["RMS", "DISPLACEMENT"], 2),
];

fn parse_iteration<S: AsRef<str>>(
    lines: &[S],
    itr_line: usize,
    num_atom: usize,
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<OptIteration> {
    let name = lines[itr_line].as_ref().trim().to_string();
    let structure = slice_structure(lines, itr_line + 1, num_atom, Some(&name), frozen_atoms)?;

    let base = itr_line + num_atom;
    let (energy, decomposition) = parse_energy_line(lines, base + 2, &["ENERGY"], 1)?;
    let spin2 = labeled_token(lines, base + 3, &["SPIN"], 1)?;
    let lambda = labeled_token(lines, base + 4, &["LAMDA"], 1)?;
    let trust_radius = labeled_token(lines, base + 5, &["TRUST RADII"], 2)?;
    let step_radius = labeled_token(lines, base + 6, &["STEP RADII"], 2)?;

    let mut metrics = Vec::with_capacity(ITR_METRIC_FIELDS.len());
    for (offset, labels, token) in ITR_METRIC_FIELDS.iter() {
        let value = labeled_token(lines, base + offset, labels, *token)?;
        let threshold = labeled_token(lines, base + offset, labels, token + 1)?;
        metrics.push(MetricValue { value, threshold });
    }

    Ok(OptIteration {
        structure,
        energy,
        decomposition,
        spin2,
        lambda,
        trust_radius,
        step_radius,
        metrics: ConvergenceMetrics {
            maximum_force: metrics[0],
            rms_force: metrics[1],
            maximum_displacement: metrics[2],
            rms_displacement: metrics[3],
        },
    })
}

fn parse_optimized<S: AsRef<str>>(
    lines: &[S],
    opt_line: usize,
    num_atom: usize,
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<OptimizedPoint> {
    let structure = slice_structure(
        lines,
        opt_line + 1,
        num_atom,
        Some("Optimized structure"),
        frozen_atoms,
    )?;

    let base = opt_line + num_atom;
    // "ENERGY = E (e1 : e2)" / "Spin(**2) = S": 值在第 3 个字段
    let (energy, decomposition) = parse_energy_line(lines, base + 1, &["ENERGY"], 2)?;
    let spin2 = labeled_token(lines, base + 2, &["SPIN"], 2)?;

    Ok(OptimizedPoint {
        structure,
        energy,
        decomposition,
        spin2,
    })
}

/// 解析 ENERGY 行: 主能量值 + 可选的 "(e1 : e2)" 分解
///
/// GRRM17 不打印分解字段，返回 `None`（而不是 0 值哨兵）。
fn parse_energy_line<S: AsRef<str>>(
    lines: &[S],
    idx: usize,
    labels: &[&str],
    token: usize,
) -> Result<(rust_decimal::Decimal, Option<EnergyDecomposition>)> {
    let energy = labeled_token(lines, idx, labels, token)?;
    let line = line_at(lines, idx, "ENERGY")?;

    let decomposition = if line.contains('(') && line.contains(':') {
        let inner = line
            .split('(')
            .nth(1)
            .ok_or_else(|| GrrmKitError::format("energy decomposition", line.trim()))?;
        let mut parts = inner.split(':');
        let e1 = parts
            .next()
            .ok_or_else(|| GrrmKitError::format("energy decomposition", line.trim()))?;
        let e2 = parts
            .next()
            .ok_or_else(|| GrrmKitError::format("energy decomposition", line.trim()))?;
        let e1 = parse_decimal(e1.trim(), line)?;
        let e2 = parse_decimal(e2.trim().trim_end_matches(')').trim(), line)?;
        Some(EnergyDecomposition { e1, e2 })
    } else {
        None
    };

    Ok((energy, decomposition))
}

/// 从 `start` 起切出 `num_atom` 行坐标并解析为结构
pub(crate) fn slice_structure<S: AsRef<str>>(
    lines: &[S],
    start: usize,
    num_atom: usize,
    name: Option<&str>,
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<Structure> {
    if start + num_atom > lines.len() {
        return Err(GrrmKitError::format(
            "structure block (truncated)",
            name.unwrap_or("<unnamed>"),
        ));
    }
    Structure::from_lines(&lines[start..start + num_atom], name, frozen_atoms)
}

fn require_optimized(optimized: &Option<OptimizedPoint>, line: &str) -> Result<()> {
    if optimized.is_none() {
        return Err(GrrmKitError::Consistency(format!(
            "'{}' reported without an optimized structure",
            line.trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn itr_block(n: usize, energy: &str, decomposed: bool) -> String {
        let energy_line = if decomposed {
            format!("ENERGY    {e}    ( {e} : {e} )", e = energy)
        } else {
            format!("ENERGY    {}", energy)
        };
        format!(
            "# ITR. {n}\n\
             C     0.000000000000   0.000000000000   0.000000000000\n\
             O     1.200000000000   0.000000000000   0.000000000000\n\
             H     2.000000000000   0.500000000000   0.000000000000\n\
             \x20            Item            Value      Threshold\n\
             {energy_line}\n\
             Spin(**2)     0.000000000000\n\
             LAMDA        -0.001234000000\n\
             TRUST RADII   0.100000000000\n\
             STEP RADII    0.050000000000\n\
             MAXIMUM  FORCE        0.002000000000   0.000300000000\n\
             RMS      FORCE        0.001000000000   0.000200000000\n\
             MAXIMUM  DISPLACEMENT 0.000400000000   0.001500000000\n\
             RMS      DISPLACEMENT 0.000200000000   0.001000000000\n"
        )
    }

    fn optimized_block(energy: &str) -> String {
        format!(
            "Optimized structure, SYMMETRY = C1\n\
             C     0.000000000000   0.000000000000   0.000000000000\n\
             O     1.190000000000   0.000000000000   0.000000000000\n\
             H     1.990000000000   0.490000000000   0.000000000000\n\
             ENERGY    =  {e}\n\
             Spin(**2) =   0.000000000000\n",
            e = energy
        )
    }

    fn to_lines(text: String) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_min_found_two_iterations() {
        let text = format!(
            "{m}\n{}{}{}Minimum point was found.\n{m}\n",
            itr_block(0, "-113.801159899000", true),
            itr_block(1, "-113.805000000000", true),
            optimized_block("-113.805100000000"),
            m = crate::parsers::OPT_MARKER
        );
        let job = parse_opt_block(&to_lines(text), None).unwrap();

        assert_eq!(job.num_atom, 3);
        assert_eq!(job.iterations.len(), 2);
        assert_eq!(job.status, OptStatus::MinFound);
        let optimized = job.optimized.as_ref().unwrap();
        assert_eq!(
            optimized.energy,
            Decimal::from_str("-113.805100000000").unwrap()
        );
        assert_eq!(optimized.structure.num_atom(), 3);
        assert_eq!(job.iterations[0].structure.name.as_deref(), Some("# ITR. 0"));
    }

    #[test]
    fn test_convergence_flags_follow_thresholds() {
        let text = format!(
            "{m}\n{}",
            itr_block(0, "-1.000000000000", true),
            m = crate::parsers::OPT_MARKER
        );
        let job = parse_opt_block(&to_lines(text), None).unwrap();
        let metrics = &job.iterations[0].metrics;

        // 0.002 > 0.0003, 0.001 > 0.0002 -> 力未收敛; 位移两项收敛
        assert!(!metrics.maximum_force.converged());
        assert!(!metrics.rms_force.converged());
        assert!(metrics.maximum_displacement.converged());
        assert!(metrics.rms_displacement.converged());
        assert!(!metrics.all_converged());
    }

    #[test]
    fn test_legacy_format_without_decomposition() {
        let text = format!(
            "{m}\n{}",
            itr_block(0, "-1.500000000000", false),
            m = crate::parsers::OPT_MARKER
        );
        let job = parse_opt_block(&to_lines(text), None).unwrap();
        assert!(job.iterations[0].decomposition.is_none());
        assert_eq!(job.iterations[0].energy, Decimal::from_str("-1.5").unwrap());
    }

    #[test]
    fn test_decomposition_parsed_when_present() {
        let text = format!(
            "{m}\n{}",
            itr_block(0, "-756.738121237908", true),
            m = crate::parsers::OPT_MARKER
        );
        let job = parse_opt_block(&to_lines(text), None).unwrap();
        let decomposition = job.iterations[0].decomposition.unwrap();
        assert_eq!(
            decomposition.e1,
            Decimal::from_str("-756.738121237908").unwrap()
        );
    }

    #[test]
    fn test_reopened_block_without_sentinel_is_not_converged() {
        let text = format!(
            "{m}\n{}{m}\n",
            itr_block(0, "-1.000000000000", true),
            m = crate::parsers::OPT_MARKER
        );
        let job = parse_opt_block(&to_lines(text), None).unwrap();
        assert_eq!(job.status, OptStatus::NotConverged);
    }

    #[test]
    fn test_unterminated_block_stays_unfinished() {
        let text = format!(
            "{m}\n{}",
            itr_block(0, "-1.000000000000", true),
            m = crate::parsers::OPT_MARKER
        );
        let job = parse_opt_block(&to_lines(text), None).unwrap();
        assert_eq!(job.status, OptStatus::Unfinished);
    }

    #[test]
    fn test_min_sentinel_without_optimized_structure_is_inconsistent() {
        let text = format!(
            "{m}\n{}Minimum point was found.\n{m}\n",
            itr_block(0, "-1.000000000000", true),
            m = crate::parsers::OPT_MARKER
        );
        assert!(matches!(
            parse_opt_block(&to_lines(text), None),
            Err(GrrmKitError::Consistency(_))
        ));
    }

    #[test]
    fn test_mislabeled_field_is_format_error() {
        let block = itr_block(0, "-1.000000000000", true)
            .replace("Spin(**2)", "WRONG LABEL");
        let text = format!("{m}\n{}", block, m = crate::parsers::OPT_MARKER);
        assert!(matches!(
            parse_opt_block(&to_lines(text), None),
            Err(GrrmKitError::Format { .. })
        ));
    }
}
