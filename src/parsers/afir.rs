//! # AFIR 路径总结解析器
//!
//! 解析日志末尾的 "---Profile of AFIR path---" 段落：
//! 迭代号-长度-能量三列剖面，以及其后的近似 TS/EQ 结构序列。
//! 近似结构段缺失时只返回剖面（早期版本的日志没有该段）。
//!
//! ## 依赖关系
//! - 被 `parsers/log.rs` 调用
//! - 使用 `models/afir.rs`

use crate::error::{GrrmKitError, Result};
use crate::models::afir::{AfirApproximate, AfirPath, AfirProfilePoint};
use crate::models::structure::AtomCoord;
use crate::parsers::opt::slice_structure;
use crate::parsers::{line_at, parse_decimal};

/// 解析 AFIR 路径段落（`lines[0]` 为剖面标题行）
pub fn parse_afir_path<S: AsRef<str>>(
    lines: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<AfirPath> {
    if lines.is_empty() || !lines[0].as_ref().starts_with("---Profile of AFIR path") {
        return Err(GrrmKitError::Consistency(
            "AFIR section does not start with a profile header".to_string(),
        ));
    }

    let points = read_profile(lines)?;
    let approximate_structures = read_approximate_structures(lines, frozen_atoms)?;

    Ok(AfirPath {
        points,
        approximate_structures,
    })
}

fn read_profile<S: AsRef<str>>(lines: &[S]) -> Result<Vec<AfirProfilePoint>> {
    let mut points = Vec::new();
    // 标题行 + 表头之后逐行读取
    for line in lines.iter().skip(2) {
        let line = line.as_ref();
        if line.trim().is_empty() {
            break;
        }
        let terms: Vec<&str> = line.split_whitespace().collect();
        if terms.len() < 3 {
            return Err(GrrmKitError::format("AFIR profile line", line.trim()));
        }
        let itr: usize = terms[0]
            .parse()
            .map_err(|_| GrrmKitError::format("AFIR profile line", line.trim()))?;
        points.push(AfirProfilePoint {
            itr,
            length: parse_decimal(terms[1], line)?,
            energy: parse_decimal(terms[2], line)?,
        });
    }
    Ok(points)
}

fn read_approximate_structures<S: AsRef<str>>(
    lines: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<Vec<AfirApproximate>> {
    let anchors: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.as_ref().starts_with("---Approximate"))
        .map(|(i, _)| i)
        .collect();

    let first = match anchors.first() {
        Some(&i) => i,
        None => return Ok(Vec::new()),
    };

    // 首个近似结构的 ENERGY 行间距给出原子数
    let num_atom = lines[first..]
        .iter()
        .position(|line| line.as_ref().starts_with("ENERGY"))
        .ok_or_else(|| {
            GrrmKitError::format("AFIR approximate structure (no ENERGY)", lines[first].as_ref().trim())
        })?
        - 1;

    let mut out = Vec::new();
    for &i in &anchors {
        let line = lines[i].as_ref();
        let name = line
            .replace("---", "")
            .replace(" geometry ", " ")
            .replace("between ", "")
            .replace(" and ", "-")
            .trim()
            .to_string();
        let structure = slice_structure(lines, i + 1, num_atom, Some(&name), frozen_atoms)?;
        let energy_line = line_at(lines, i + 1 + num_atom, "ENERGY")?;
        let energy_token = energy_line
            .split_whitespace()
            .nth(2)
            .ok_or_else(|| GrrmKitError::format("ENERGY line", energy_line.trim()))?;
        let energy = parse_decimal(energy_token, energy_line)?;
        out.push(AfirApproximate { structure, energy });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn to_lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_profile_only() {
        let text = "\
            ---Profile of AFIR path---\n\
            # ITR.   LENGTH    ENERGY\n\
            0   0.000000   -10.000000000000\n\
            1   0.500000   -10.100000000000\n\
            2   1.000000   -10.050000000000\n\
            \n";
        let path = parse_afir_path(&to_lines(text), None).unwrap();
        assert_eq!(path.points.len(), 3);
        assert_eq!(path.points[2].itr, 2);
        assert_eq!(
            path.points[1].energy,
            Decimal::from_str("-10.1").unwrap()
        );
        assert!(path.approximate_structures.is_empty());
    }

    #[test]
    fn test_profile_with_approximate_structures() {
        let text = "\
            ---Profile of AFIR path---\n\
            # ITR.   LENGTH    ENERGY\n\
            0   0.000000   -10.000000000000\n\
            1   0.500000   -10.100000000000\n\
            \n\
            ---Approximate TS geometry between EQ0 and EQ1---\n\
            C     0.000000000000   0.000000000000   0.000000000000\n\
            H     1.000000000000   0.000000000000   0.000000000000\n\
            ENERGY    =  -9.900000000000\n\
            ---Approximate EQ geometry between TS0 and TS1---\n\
            C     0.100000000000   0.000000000000   0.000000000000\n\
            H     1.100000000000   0.000000000000   0.000000000000\n\
            ENERGY    =  -10.200000000000\n";
        let path = parse_afir_path(&to_lines(text), None).unwrap();
        assert_eq!(path.points.len(), 2);
        let approx = &path.approximate_structures;
        assert_eq!(approx.len(), 2);
        assert_eq!(approx[0].structure.num_atom(), 2);
        assert_eq!(
            approx[0].structure.name.as_deref(),
            Some("Approximate TS EQ0-EQ1")
        );
        assert_eq!(approx[1].energy, Decimal::from_str("-10.2").unwrap());
    }

    #[test]
    fn test_wrong_header_is_inconsistent() {
        let text = "Energy profile along IRC\n";
        assert!(matches!(
            parse_afir_path(&to_lines(text), None),
            Err(GrrmKitError::Consistency(_))
        ));
    }
}
