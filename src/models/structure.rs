//! # 分子结构数据模型
//!
//! 定义原子坐标记录和分子结构。坐标以 `rust_decimal::Decimal` 保存，
//! 保证从日志读入到 XYZ 输出的文本精度不丢失（固定 12 位小数）。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `export/` 使用
//! - 无外部模块依赖

use crate::error::{GrrmKitError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 原子坐标记录 (元素符号 + 笛卡尔坐标)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomCoord {
    /// 元素符号（首字母大写规范化）
    pub element: String,

    pub x: Decimal,
    pub y: Decimal,
    pub z: Decimal,
}

impl AtomCoord {
    /// 从一行文本解析: `symbol x y z [ignored...]`
    ///
    /// 至少 4 个空白分隔字段，多余字段忽略。
    pub fn parse_line(line: &str) -> Result<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(GrrmKitError::format("structure line", line.trim()));
        }

        let element = capitalize_element(tokens[0]);
        let x = parse_coordinate(tokens[1], line)?;
        let y = parse_coordinate(tokens[2], line)?;
        let z = parse_coordinate(tokens[3], line)?;

        Ok(AtomCoord { element, x, y, z })
    }

    /// 格式化为一行坐标文本（符号左对齐 4 位，坐标右对齐 20 位、12 位小数）
    pub fn to_line(&self) -> String {
        format!(
            "{:<4} {:>20} {:>20} {:>20}",
            self.element,
            fixed12(&self.x),
            fixed12(&self.y),
            fixed12(&self.z)
        )
    }
}

/// 解析坐标数值，失败时报告所在行
fn parse_coordinate(token: &str, line: &str) -> Result<Decimal> {
    Decimal::from_str(token)
        .or_else(|_| Decimal::from_scientific(token))
        .map_err(|_| GrrmKitError::format("coordinate value", line.trim()))
}

/// 元素符号规范化: "c" -> "C", "FE" -> "Fe"
fn capitalize_element(symbol: &str) -> String {
    let mut chars = symbol.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// 固定 12 位小数的十进制格式化
pub fn fixed12(value: &Decimal) -> String {
    let mut v = value.round_dp(12);
    v.rescale(12);
    v.to_string()
}

/// 分子结构
///
/// 有序的活性原子坐标列表，外加可选的冻结原子列表（来自 .com 配置，
/// 不参与优化，每个作业内所有结构共享同一份冻结坐标）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// 显示名称（如 "# ITR. 3"）
    pub name: Option<String>,

    /// 活性原子
    pub atoms: Vec<AtomCoord>,

    /// 冻结原子
    pub frozen_atoms: Vec<AtomCoord>,
}

impl Structure {
    /// 从文本行序列解析结构
    ///
    /// 空行静默跳过；非空行必须可解析为坐标记录，否则返回 `Format` 错误。
    /// 输出保持输入顺序。
    pub fn from_lines<S: AsRef<str>>(
        lines: &[S],
        name: Option<&str>,
        frozen_atoms: Option<&[AtomCoord]>,
    ) -> Result<Self> {
        let mut atoms = Vec::new();
        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            atoms.push(AtomCoord::parse_line(line)?);
        }

        Ok(Structure {
            name: name.map(|n| n.to_string()),
            atoms,
            frozen_atoms: frozen_atoms.map(|f| f.to_vec()).unwrap_or_default(),
        })
    }

    /// 活性原子数
    pub fn num_atom(&self) -> usize {
        self.atoms.len()
    }

    /// 输出的原子总数（活性 + 冻结）
    pub fn total_atoms(&self) -> usize {
        self.atoms.len() + self.frozen_atoms.len()
    }

    /// 坐标块文本（每原子一行，末尾带换行）
    pub fn coordinate_block(&self, include_frozen: bool) -> String {
        let mut block = String::new();
        for atom in &self.atoms {
            block.push_str(&atom.to_line());
            block.push('\n');
        }
        if include_frozen {
            for atom in &self.frozen_atoms {
                block.push_str(&atom.to_line());
                block.push('\n');
            }
        }
        block
    }

    /// 一帧 XYZ 文本: 原子数行 + 标题行 + 坐标块
    pub fn xyz_frame(&self, title: &str) -> String {
        format!(
            "{}\n{}\n{}",
            self.total_atoms(),
            title.trim_end(),
            self.coordinate_block(true)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_coord_parse_line() {
        let atom = AtomCoord::parse_line("  c   0.123456789012  -1.5   2.0  extra").unwrap();
        assert_eq!(atom.element, "C");
        assert_eq!(atom.x, Decimal::from_str("0.123456789012").unwrap());
        assert_eq!(atom.y, Decimal::from_str("-1.5").unwrap());
    }

    #[test]
    fn test_atom_coord_too_few_tokens() {
        let err = AtomCoord::parse_line("H 0.0 1.0").unwrap_err();
        assert!(err.to_string().contains("H 0.0 1.0"));
    }

    #[test]
    fn test_atom_coord_bad_number() {
        assert!(AtomCoord::parse_line("H 0.0 abc 1.0").is_err());
    }

    #[test]
    fn test_structure_preserves_order_and_skips_blanks() {
        let lines = vec![
            "C  0.0 0.0 0.0",
            "",
            "O  1.2 0.0 0.0",
            "   ",
            "H  2.0 0.5 0.0",
        ];
        let s = Structure::from_lines(&lines, Some("test"), None).unwrap();
        assert_eq!(s.num_atom(), 3);
        assert_eq!(s.atoms[0].element, "C");
        assert_eq!(s.atoms[1].element, "O");
        assert_eq!(s.atoms[2].element, "H");
    }

    #[test]
    fn test_round_trip_through_coordinate_block() {
        let lines = vec![
            "C    -0.123456789012   1.000000000000   0.000000000001",
            "H     2.500000000000  -3.141592653590  12.000000000000",
        ];
        let s = Structure::from_lines(&lines, None, None).unwrap();
        let block = s.coordinate_block(true);
        let block_lines: Vec<&str> = block.lines().collect();
        let reparsed = Structure::from_lines(&block_lines, None, None).unwrap();
        assert_eq!(s.atoms, reparsed.atoms);
    }

    #[test]
    fn test_fixed12_pads_and_rounds() {
        let v = Decimal::from_str("1.5").unwrap();
        assert_eq!(fixed12(&v), "1.500000000000");
        let v = Decimal::from_str("-2").unwrap();
        assert_eq!(fixed12(&v), "-2.000000000000");
    }

    #[test]
    fn test_xyz_frame_counts_frozen_atoms() {
        let frozen = vec![AtomCoord::parse_line("Pt 0.0 0.0 1.0").unwrap()];
        let s = Structure::from_lines(&["H 0.0 0.0 0.0"], Some("s"), Some(&frozen)).unwrap();
        let frame = s.xyz_frame("title");
        assert!(frame.starts_with("2\ntitle\n"));
        assert!(frame.contains("Pt"));
    }
}
