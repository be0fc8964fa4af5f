//! # XYZ 轨迹导出
//!
//! 多帧 XYZ 文本构造：优化轨迹、IRC 路径（单段/全路径）、LUP 节点链、
//! 近似结构集合和简正模式振动动画。构造器均为纯函数，写盘由
//! `export::write_text_file` 统一处理。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 使用
//! - 使用 `models/` 数据模型

use rust_decimal::prelude::ToPrimitive;

use crate::error::{GrrmKitError, Result};
use crate::models::freq::FreqJob;
use crate::models::irc::{IrcJob, IrcPath};
use crate::models::lup::{ApproximateStructure, LupPath};
use crate::models::opt::OptJob;
use crate::models::structure::Structure;

/// 单结构一帧
pub fn structure_xyz(structure: &Structure, title: Option<&str>) -> String {
    let title = title
        .or(structure.name.as_deref())
        .unwrap_or("");
    structure.xyz_frame(title)
}

/// 优化轨迹: 每迭代一帧，收敛结构（若有）为末帧
pub fn opt_trajectory_xyz(job: &OptJob) -> String {
    let mut out = String::new();
    for iteration in &job.iterations {
        out.push_str(&structure_xyz(&iteration.structure, None));
    }
    if let Some(optimized) = &job.optimized {
        out.push_str(&structure_xyz(&optimized.structure, None));
    }
    out
}

/// LUP 单次迭代的节点链
pub fn lup_nodes_xyz(path: &LupPath) -> String {
    let mut out = String::new();
    for (i, node) in path.nodes.iter().enumerate() {
        out.push_str(&node.structure.xyz_frame(&format!("# NODE {}", i)));
    }
    out
}

/// LUP 节点链的截断区间 [start, end]（闭区间，0 起）
pub fn lup_truncated_xyz(path: &LupPath, start: usize, end: usize) -> Result<String> {
    if start > end || end >= path.num_node() {
        return Err(GrrmKitError::InvalidArgument(format!(
            "node range {}-{} is outside the path (0-{})",
            start,
            end,
            path.num_node().saturating_sub(1)
        )));
    }
    let mut out = String::new();
    for (i, node) in path.nodes[start..=end].iter().enumerate() {
        out.push_str(&node.structure.xyz_frame(&format!("# NODE {}", start + i)));
    }
    Ok(out)
}

/// 近似 TS/EQ 结构集合，每结构一帧
pub fn approximate_structures_xyz(structures: &[ApproximateStructure]) -> String {
    let mut out = String::new();
    for approx in structures {
        out.push_str(&structure_xyz(&approx.structure, None));
    }
    out
}

/// IRC 单段路径（`reverse` 反转步序）
pub fn irc_segment_xyz(path: &IrcPath, reverse: bool) -> String {
    let mut out = String::new();
    let mut push = |step: &crate::models::irc::IrcStep| {
        out.push_str(&structure_xyz(&step.structure, None));
    };
    if reverse {
        path.steps.iter().rev().for_each(&mut push);
    } else {
        path.steps.iter().for_each(&mut push);
    }
    out
}

/// IRC 全路径: 反向段（倒序）+ 初始结构 + 正向段
///
/// `reverse` 输出镜像顺序。需要恰好一对前/后向路径段。
pub fn full_irc_xyz(job: &IrcJob, reverse: bool) -> Result<String> {
    let (forward, backward) = job.forward_backward_pair()?;
    let init = job
        .init_structure
        .xyz_frame("#  0 Initial Structure for IRC");

    let mut out = String::new();
    if reverse {
        out.push_str(&irc_segment_xyz(forward, true));
        out.push_str(&init);
        out.push_str(&irc_segment_xyz(backward, false));
    } else {
        out.push_str(&irc_segment_xyz(backward, true));
        out.push_str(&init);
        out.push_str(&irc_segment_xyz(forward, false));
    }
    Ok(out)
}

// ─────────────────────────────────────────────────────────────
// 简正模式振动动画
// ─────────────────────────────────────────────────────────────

/// 一个简正模式的往复振动动画
///
/// 位移权重按模式矩阵的最大原子位移向量归一:
/// `weight = max_shift / (max_vector_size * step)`，
/// 帧序为 平衡 -> +step -> 平衡 -> -step -> 平衡 的完整振动周期。
/// 冻结原子原样附加，不参与位移。
pub fn mode_animation_xyz(
    job: &FreqJob,
    mode: usize,
    max_shift: f64,
    step: usize,
) -> Result<String> {
    if mode >= job.num_modes() {
        return Err(GrrmKitError::InvalidArgument(format!(
            "mode {} is outside 0-{}",
            mode,
            job.num_modes().saturating_sub(1)
        )));
    }
    if step == 0 || max_shift <= 0.0 {
        return Err(GrrmKitError::InvalidArgument(
            "animation needs a positive step count and shift".to_string(),
        ));
    }

    let matrix = &job.mode_matrices[mode];
    let max_vector_size = matrix
        .iter()
        .map(|[x, y, z]| x * x + y * y + z * z)
        .fold(0.0_f64, f64::max)
        .sqrt();
    if max_vector_size == 0.0 {
        return Err(GrrmKitError::Consistency(format!(
            "mode {} has an all-zero displacement matrix",
            mode
        )));
    }
    let weight = max_shift / (max_vector_size * step as f64);

    let equilibrium = displaced_frame(job, mode, 0.0, "Initial Structure")?;
    let title = |scale: f64| {
        format!(
            "Mode {} ({} cm-1) shift {:+.6}",
            mode, job.frequencies[mode], scale
        )
    };

    let mut out = String::new();
    out.push_str(&equilibrium);
    for s in 1..=step {
        let scale = weight * s as f64;
        out.push_str(&displaced_frame(job, mode, scale, &title(scale))?);
    }
    for s in (1..=step).rev() {
        let scale = weight * s as f64;
        out.push_str(&displaced_frame(job, mode, scale, &title(scale))?);
    }
    out.push_str(&equilibrium);
    for s in 1..=step {
        let scale = -weight * s as f64;
        out.push_str(&displaced_frame(job, mode, scale, &title(scale))?);
    }
    for s in (1..=step).rev() {
        let scale = -weight * s as f64;
        out.push_str(&displaced_frame(job, mode, scale, &title(scale))?);
    }
    out.push_str(&equilibrium);
    Ok(out)
}

fn displaced_frame(job: &FreqJob, mode: usize, scale: f64, title: &str) -> Result<String> {
    let structure = &job.init_structure;
    let matrix = &job.mode_matrices[mode];
    if matrix.len() != structure.num_atom() {
        return Err(GrrmKitError::Consistency(format!(
            "mode {} displacement rows do not match the atom count",
            mode
        )));
    }

    let mut out = format!("{}\n{}\n", structure.total_atoms(), title);
    for (atom, displacement) in structure.atoms.iter().zip(matrix.iter()) {
        let x = decimal_to_f64(&atom.x) + scale * displacement[0];
        let y = decimal_to_f64(&atom.y) + scale * displacement[1];
        let z = decimal_to_f64(&atom.z) + scale * displacement[2];
        out.push_str(&format!(
            "{:<4} {:>20.12} {:>20.12} {:>20.12}\n",
            atom.element, x, y, z
        ));
    }
    for atom in &structure.frozen_atoms {
        out.push_str(&atom.to_line());
        out.push('\n');
    }
    Ok(out)
}

fn decimal_to_f64(value: &rust_decimal::Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::irc::{FollowingMode, IrcStep, PathDirection};
    use crate::models::lup::LupNode;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn structure(name: &str, z: &str) -> Structure {
        Structure::from_lines(
            &[
                format!("C 0.0 0.0 {}", z),
                format!("H 1.0 0.0 {}", z),
            ],
            Some(name),
            None,
        )
        .unwrap()
    }

    fn irc_path(direction: PathDirection, names: &[&str]) -> IrcPath {
        IrcPath {
            mode: FollowingMode::Irc,
            direction,
            steps: names
                .iter()
                .map(|n| IrcStep {
                    structure: structure(n, "0.0"),
                    energy: Decimal::ZERO,
                    spin2: Decimal::ZERO,
                })
                .collect(),
            opt_job: None,
            freq_job: None,
        }
    }

    fn frame_titles(xyz: &str) -> Vec<String> {
        // 每帧 2 原子: 帧长 4 行，标题在第 2 行
        xyz.lines()
            .collect::<Vec<_>>()
            .chunks(4)
            .map(|chunk| chunk[1].to_string())
            .collect()
    }

    #[test]
    fn test_full_irc_ordering() {
        let job = IrcJob {
            name: None,
            num_atom: 2,
            init_structure: structure("init", "0.0"),
            init_freq_job: None,
            paths: vec![
                irc_path(PathDirection::Forward, &["f1", "f2"]),
                irc_path(PathDirection::Backward, &["b1", "b2"]),
            ],
            profile: Vec::new(),
        };

        let titles = frame_titles(&full_irc_xyz(&job, false).unwrap());
        assert_eq!(
            titles,
            vec!["b2", "b1", "#  0 Initial Structure for IRC", "f1", "f2"]
        );

        let titles = frame_titles(&full_irc_xyz(&job, true).unwrap());
        assert_eq!(
            titles,
            vec!["f2", "f1", "#  0 Initial Structure for IRC", "b1", "b2"]
        );
    }

    #[test]
    fn test_lup_truncated_range_check() {
        let path = LupPath {
            name: "ITR. 0".to_string(),
            num_atom: 2,
            nodes: (0..3)
                .map(|i| LupNode {
                    structure: structure(&format!("n{}", i), "0.0"),
                    energy: Decimal::ZERO,
                })
                .collect(),
            profile: Vec::new(),
        };

        let titles = frame_titles(&lup_truncated_xyz(&path, 1, 2).unwrap());
        assert_eq!(titles, vec!["# NODE 1", "# NODE 2"]);

        assert!(matches!(
            lup_truncated_xyz(&path, 1, 3),
            Err(GrrmKitError::InvalidArgument(_))
        ));
        assert!(matches!(
            lup_truncated_xyz(&path, 2, 1),
            Err(GrrmKitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_mode_animation_frame_count_and_bounds() {
        let job = FreqJob {
            name: None,
            num_atom: 2,
            init_structure: structure("eq", "0.0"),
            frequencies: vec![Decimal::from_str("-500.0").unwrap()],
            mode_matrices: vec![vec![[0.1, 0.0, 0.0], [0.0, 0.2, 0.0]]],
            thermal_data: Vec::new(),
        };

        let xyz = mode_animation_xyz(&job, 0, 0.3, 3).unwrap();
        // 3 帧平衡 + 4 段各 3 帧位移
        assert_eq!(frame_titles(&xyz).len(), 15);
        assert!(xyz.contains("Mode 0 (-500.0 cm-1)"));

        assert!(matches!(
            mode_animation_xyz(&job, 1, 0.3, 3),
            Err(GrrmKitError::InvalidArgument(_))
        ));
        assert!(matches!(
            mode_animation_xyz(&job, 0, 0.3, 0),
            Err(GrrmKitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_opt_trajectory_includes_optimized_frame() {
        use crate::models::opt::{OptimizedPoint, OptStatus};
        let job = OptJob {
            name: None,
            num_atom: 2,
            iterations: Vec::new(),
            optimized: Some(OptimizedPoint {
                structure: structure("Optimized structure", "0.1"),
                energy: Decimal::ZERO,
                decomposition: None,
                spin2: Decimal::ZERO,
            }),
            status: OptStatus::MinFound,
        };
        let titles = frame_titles(&opt_trajectory_xyz(&job));
        assert_eq!(titles, vec!["Optimized structure"]);
    }
}
