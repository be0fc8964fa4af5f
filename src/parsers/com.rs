//! # GRRM 输入文件 (.com) 解析器
//!
//! 日志文件本身不记录冻结原子，需要回读同名输入文件：
//! - "%" 开头的链接选项行
//! - "#" 开头的方法行
//! - 电荷/自旋多重度行
//! - "Frozen Atoms" 段落（可选）
//! - "Options" 段落（可选）
//!
//! 子作业日志（如 `foo_TS3.log`）的输入文件按父作业名回溯查找。
//!
//! ## 依赖关系
//! - 被 `commands/` 各命令调用
//! - 使用 `models/structure.rs`

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{GrrmKitError, Result};
use crate::models::structure::AtomCoord;

/// GRRM 输入文件内容
#[derive(Debug, Clone)]
pub struct ComFile {
    /// "%" 链接选项行（不含前缀）
    pub link_options: Vec<String>,
    /// "#" 方法行（不含前缀）
    pub method: String,
    pub charge: i32,
    pub multi: i32,
    /// "Options" 段落的原样行
    pub method_options: Vec<String>,
    /// "Frozen Atoms" 段落的坐标
    pub frozen_atom_coordinates: Vec<AtomCoord>,
}

impl ComFile {
    pub fn frozen_atoms(&self) -> Option<&[AtomCoord]> {
        if self.frozen_atom_coordinates.is_empty() {
            None
        } else {
            Some(&self.frozen_atom_coordinates)
        }
    }
}

/// 解析输入文件文本
pub fn parse_com_lines<S: AsRef<str>>(lines: &[S]) -> Result<ComFile> {
    let mut link_options = Vec::new();
    let mut body: Vec<&str> = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if line.starts_with('%') {
            link_options.push(line[1..].trim().to_string());
        } else {
            body.push(line);
        }
    }

    let method_line = *body
        .first()
        .ok_or_else(|| GrrmKitError::format("com file", "<empty input>"))?;
    if !method_line.starts_with('#') {
        return Err(GrrmKitError::format("com file method line", method_line.trim()));
    }
    let method = method_line[1..].trim().to_string();

    // 方法行后: 空行, 电荷/多重度行
    let charge_line = body
        .get(2)
        .copied()
        .ok_or_else(|| GrrmKitError::format("com file charge line", "<unexpected end of file>"))?;
    let mut terms = charge_line.split_whitespace();
    let charge: i32 = terms
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| GrrmKitError::format("com file charge line", charge_line.trim()))?;
    let multi: i32 = terms
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| GrrmKitError::format("com file charge line", charge_line.trim()))?;

    let mut method_options = Vec::new();
    if let Some(start) = body
        .iter()
        .position(|line| line.trim().eq_ignore_ascii_case("options"))
    {
        for line in &body[start + 1..] {
            if line.trim().is_empty() {
                break;
            }
            method_options.push(line.trim().to_string());
        }
    }

    let mut frozen_atom_coordinates = Vec::new();
    if let Some(start) = body
        .iter()
        .position(|line| line.trim().to_lowercase().starts_with("frozen atoms"))
    {
        for line in &body[start + 1..] {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("options") {
                break;
            }
            frozen_atom_coordinates.push(AtomCoord::parse_line(line)?);
        }
    }

    Ok(ComFile {
        link_options,
        method,
        charge,
        multi,
        method_options,
        frozen_atom_coordinates,
    })
}

/// 读取并解析输入文件
pub fn parse_com_file(path: &Path) -> Result<ComFile> {
    let text = fs::read_to_string(path).map_err(|source| GrrmKitError::FileReadError {
        path: path.display().to_string(),
        source,
    })?;
    let lines: Vec<&str> = text.lines().collect();
    parse_com_lines(&lines)
}

/// 定位日志对应的输入文件
///
/// 先找同名 .com；子作业日志（`foo_TS3.log`, `foo_EQ12.log` 等）
/// 再按去掉末段后缀的父作业名查找。都不存在时返回 `None`。
pub fn find_parent_com_file(log_path: &Path) -> Option<PathBuf> {
    let stem = log_path.file_stem()?.to_str()?;

    let sibling = log_path.with_file_name(format!("{}.com", stem));
    if sibling.is_file() {
        return Some(sibling);
    }

    let suffix_start = stem.rfind('_')?;
    let suffix = &stem[suffix_start..];
    let pattern = Regex::new(r"^_[a-zA-Z]{1,2}\d+$").ok()?;
    if !pattern.is_match(suffix) {
        return None;
    }
    let parent = log_path.with_file_name(format!("{}.com", &stem[..suffix_start]));
    if parent.is_file() {
        Some(parent)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_minimal_com_file() {
        let text = "\
            %link=gaussian\n\
            # MIN/B3LYP/6-31G\n\
            \n\
            0 1\n\
            C     0.000000000000   0.000000000000   0.000000000000\n\
            O     1.200000000000   0.000000000000   0.000000000000\n";
        let com = parse_com_lines(&to_lines(text)).unwrap();
        assert_eq!(com.link_options, vec!["link=gaussian"]);
        assert_eq!(com.method, "MIN/B3LYP/6-31G");
        assert_eq!(com.charge, 0);
        assert_eq!(com.multi, 1);
        assert!(com.frozen_atoms().is_none());
        assert!(com.method_options.is_empty());
    }

    #[test]
    fn test_frozen_atoms_and_options() {
        let text = "\
            # SADDLE/B3LYP/6-31G\n\
            \n\
            -1 2\n\
            C     0.000000000000   0.000000000000   0.000000000000\n\
            Frozen Atoms\n\
            PT    0.000000000000   0.000000000000   2.500000000000\n\
            Pt    0.000000000000   2.500000000000   2.500000000000\n\
            Options\n\
            GauProc=4\n\
            StepSize=0.1\n";
        let com = parse_com_lines(&to_lines(text)).unwrap();
        assert_eq!(com.charge, -1);
        assert_eq!(com.multi, 2);
        let frozen = com.frozen_atoms().unwrap();
        assert_eq!(frozen.len(), 2);
        // 元素符号规范化
        assert_eq!(frozen[0].element, "Pt");
        assert_eq!(com.method_options, vec!["GauProc=4", "StepSize=0.1"]);
    }

    #[test]
    fn test_missing_method_line_is_format_error() {
        let text = "0 1\nC 0.0 0.0 0.0\n";
        assert!(matches!(
            parse_com_lines(&to_lines(text)),
            Err(GrrmKitError::Format { .. })
        ));
    }

    #[test]
    fn test_parent_com_lookup() {
        let dir = std::env::temp_dir().join("grrmkit-com-lookup-test");
        std::fs::create_dir_all(&dir).unwrap();
        let com = dir.join("job.com");
        std::fs::write(&com, "# MIN\n\n0 1\n").unwrap();

        assert_eq!(find_parent_com_file(&dir.join("job.log")), Some(com.clone()));
        assert_eq!(find_parent_com_file(&dir.join("job_TS3.log")), Some(com.clone()));
        assert_eq!(find_parent_com_file(&dir.join("job_EQ12.log")), Some(com));
        assert_eq!(find_parent_com_file(&dir.join("other_TS3.log")), None);
        assert_eq!(find_parent_com_file(&dir.join("job_snapshot.log")), None);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
