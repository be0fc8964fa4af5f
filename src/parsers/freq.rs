//! # 振动频率块解析器
//!
//! 解析一个闭合 FREQ 块：
//! - 初始几何: "Geometry (Origin = Center of Mass..." 到下一空行
//! - 简正模式: 空行分隔的列块，每块 1-3 个模式；第 2 行为频率值，
//!   其后每 3 行 (x/y/z) 为一个原子的位移分量
//! - 热化学: 每条 "Thermochemistry" 行后 14 行按固定偏移 + 标签前缀解析
//!
//! 缺失 Thermochemistry 段落表示计算被中断，不是错误：
//! 已读到的模式保留，热化学列表为空。
//!
//! ## 依赖关系
//! - 被 `parsers/log.rs`, `parsers/irc.rs`, `parsers/lup.rs` 调用
//! - 使用 `models/freq.rs`

use rust_decimal::Decimal;

use crate::error::{GrrmKitError, Result};
use crate::models::freq::{FreqJob, ModeMatrix, ThermalData};
use crate::models::structure::{AtomCoord, Structure};
use crate::parsers::{line_at, parse_decimal, FREQ_MARKER};

/// 热化学记录的定位字段表: (相对 Thermochemistry 行的偏移, 期望标签前缀)
///
/// 顺序即 `ThermalData` 字段顺序。"Enthalpie(0K)" 必须先于 "Enthalpie"
/// 匹配，因此偏移是合同的一部分，不做模糊搜索。
const THERMAL_FIELDS: [(usize, &str); 14] = [
    (1, "E(el)"),
    (2, "ZPVE"),
    (3, "Enthalpie(0K)"),
    (4, "E(tr)"),
    (5, "E(rot)"),
    (6, "E(vib)"),
    (7, "H-E(el)"),
    (8, "Enthalpie"),
    (9, "S(el)"),
    (10, "S(tr)"),
    (11, "S(rot)"),
    (12, "S(vib)"),
    (13, "G-E(el)"),
    (14, "Free Energy"),
];

/// 解析 FREQ 作业块
pub fn parse_freq_block<S: AsRef<str>>(
    lines: &[S],
    frozen_atoms: Option<&[AtomCoord]>,
) -> Result<FreqJob> {
    if lines.is_empty() || !lines[0].as_ref().starts_with(FREQ_MARKER) {
        return Err(GrrmKitError::Consistency(
            "FREQ block does not start with a FREQ marker line".to_string(),
        ));
    }

    // 初始几何: Geometry 行到下一空行
    let mut geometry_start = None;
    let mut geometry_end = None;
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.starts_with("Geometry (Origin = Center of Mass") {
            geometry_start = Some(i);
        } else if geometry_start.is_some() && line.trim().is_empty() {
            geometry_end = Some(i);
            break;
        }
    }
    let (geometry_start, geometry_end) = match (geometry_start, geometry_end) {
        (Some(s), Some(e)) => (s, e),
        _ => {
            return Err(GrrmKitError::format(
                "FREQ block (no geometry section)",
                lines[0].as_ref().trim(),
            ))
        }
    };

    let init_structure = Structure::from_lines(
        &lines[geometry_start + 1..geometry_end],
        Some("Initial Structure"),
        frozen_atoms,
    )?;
    let num_atom = init_structure.num_atom();

    // 模式列块: 空行分隔，直到 Thermochemistry 行（或块结束）
    let mut mode_blocks: Vec<Vec<&str>> = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut thermochemistry_start = None;
    for (i, line) in lines.iter().enumerate().skip(geometry_end + 1) {
        let line = line.as_ref();
        if line.trim().is_empty() {
            mode_blocks.push(std::mem::take(&mut block));
            continue;
        }
        if line.starts_with("Thermochemistry") {
            thermochemistry_start = Some(i);
            break;
        }
        if line.starts_with(FREQ_MARKER) {
            // 闭合分隔行: 模式段落结束（无热化学的中断计算）
            break;
        }
        block.push(line);
    }

    if !block.is_empty() {
        mode_blocks.push(block);
    }

    let mut frequencies: Vec<Decimal> = Vec::new();
    let mut mode_matrices: Vec<ModeMatrix> = Vec::new();
    for block in mode_blocks.iter().filter(|b| !b.is_empty()) {
        read_mode_block(block, num_atom, &mut frequencies, &mut mode_matrices)?;
    }

    let mut thermal_data = Vec::new();
    if let Some(start) = thermochemistry_start {
        // 两遍: 先定位全部 Thermochemistry 锚点，再逐条切片
        let tail = &lines[start..];
        let anchors: Vec<usize> = tail
            .iter()
            .enumerate()
            .filter(|(_, l)| l.as_ref().starts_with("Thermochemistry"))
            .map(|(i, _)| i)
            .collect();
        for anchor in anchors {
            thermal_data.push(read_thermal_record(tail, anchor)?);
        }
    }

    Ok(FreqJob {
        name: None,
        num_atom,
        init_structure,
        frequencies,
        mode_matrices,
        thermal_data,
    })
}

/// 读取一个模式列块（1-3 个模式并排）
///
/// ```text
/// \      1             2             3
/// Freq.  :   1256.54809523   1272.49620328   1273.57870656
/// <row 2: 忽略>
/// A 1 x:       0.00000000     -0.05659906      0.00000000
/// A 1 y:     ...
/// A 1 z:     ...
/// (每原子 3 行)
/// ```
fn read_mode_block(
    block: &[&str],
    num_atom: usize,
    frequencies: &mut Vec<Decimal>,
    mode_matrices: &mut Vec<ModeMatrix>,
) -> Result<()> {
    let column_num = block[0].split_whitespace().count();
    if !(1..=3).contains(&column_num) {
        return Err(GrrmKitError::format(
            "normal mode block header",
            block[0].trim(),
        ));
    }
    if block.len() < 3 + 3 * num_atom {
        return Err(GrrmKitError::format(
            "normal mode block (truncated)",
            block[0].trim(),
        ));
    }

    let freq_values = values_after_colon(block[1], column_num)?;
    for value in &freq_values {
        frequencies.push(parse_decimal(value, block[1])?);
    }

    let mut matrices: Vec<ModeMatrix> = vec![vec![[0.0; 3]; num_atom]; column_num];

    // 每 3 行一组 (x, y, z)，第 c 列写入第 c 个模式矩阵
    for atom in 0..num_atom {
        let row = 3 + atom * 3;
        let xs = values_after_colon(block[row], column_num)?;
        let ys = values_after_colon(block[row + 1], column_num)?;
        let zs = values_after_colon(block[row + 2], column_num)?;
        for c in 0..column_num {
            let x = parse_f64(xs[c], block[row])?;
            let y = parse_f64(ys[c], block[row + 1])?;
            let z = parse_f64(zs[c], block[row + 2])?;
            matrices[c][atom] = [x, y, z];
        }
    }

    mode_matrices.extend(matrices);
    Ok(())
}

/// 取冒号之后的空白分隔字段，校验数量
fn values_after_colon(line: &str, expected: usize) -> Result<Vec<&str>> {
    let after = line
        .splitn(2, ':')
        .nth(1)
        .ok_or_else(|| GrrmKitError::format("normal mode row", line.trim()))?;
    let values: Vec<&str> = after.split_whitespace().collect();
    if values.len() < expected {
        return Err(GrrmKitError::format("normal mode row", line.trim()));
    }
    Ok(values)
}

fn parse_f64(token: &str, line: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| GrrmKitError::format("normal mode value", line.trim()))
}

/// 读取一条热化学记录（Thermochemistry 行 + 后续 14 行）
fn read_thermal_record<S: AsRef<str>>(lines: &[S], anchor: usize) -> Result<ThermalData> {
    let header_line = line_at(lines, anchor, "Thermochemistry")?;
    let header = header_line.split_whitespace().collect::<Vec<_>>().join(" ");

    // 温度/压力: 可解析为数值、且下一字段以 K / Atm 开头的字段
    let mut temperature = Decimal::from(-1);
    let mut pressure = Decimal::from(-1);
    let terms: Vec<&str> = header.split_whitespace().collect();
    for pair in terms.windows(2) {
        if let Ok(v) = pair[0].parse::<Decimal>() {
            if pair[1].starts_with('K') {
                temperature = v;
            } else if pair[1].starts_with("Atm") {
                pressure = v;
            }
        }
    }

    let mut values = Vec::with_capacity(THERMAL_FIELDS.len());
    for (offset, label) in THERMAL_FIELDS.iter() {
        values.push(labeled_value(lines, anchor + offset, label)?);
    }

    Ok(ThermalData {
        header,
        temperature,
        pressure,
        e_el: values[0],
        zpve: values[1],
        h_zero: values[2],
        e_tr: values[3],
        e_rot: values[4],
        e_vib: values[5],
        h_corr: values[6],
        h: values[7],
        s_el: values[8],
        s_tr: values[9],
        s_rot: values[10],
        s_vib: values[11],
        g_corr: values[12],
        g: values[13],
    })
}

/// 校验标签前缀后取 "=" 之后、"(" 之前的数值
fn labeled_value<S: AsRef<str>>(lines: &[S], idx: usize, label: &str) -> Result<Decimal> {
    let line = line_at(lines, idx, label)?;
    if !line.trim_start().starts_with(label) {
        return Err(GrrmKitError::format(format!("{} line", label), line.trim()));
    }
    let value = line
        .splitn(2, '=')
        .nth(1)
        .ok_or_else(|| GrrmKitError::format(format!("{} line", label), line.trim()))?
        .split('(')
        .next()
        .unwrap_or("")
        .trim();
    parse_decimal(value, line)
}
