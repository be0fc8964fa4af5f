//! # CSV 数据表导出
//!
//! 能量剖面、收敛历史和热化学数据的 CSV 输出。数值列使用固定
//! 12 位小数的十进制文本，与日志原文逐位一致。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 使用
//! - 使用 `csv` crate, `models/` 数据模型

use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::models::afir::AfirPath;
use crate::models::freq::FreqJob;
use crate::models::irc::IrcJob;
use crate::models::lup::LupPath;
use crate::models::opt::OptJob;
use crate::models::structure::fixed12;

/// IRC 剖面: length, energy
pub fn write_irc_profile<W: Write>(writer: &mut csv::Writer<W>, job: &IrcJob) -> Result<()> {
    writer.write_record(["length", "energy"])?;
    for point in &job.profile {
        writer.write_record([fixed12(&point.length), fixed12(&point.energy)])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// LUP 单次迭代剖面: node, length, energy
pub fn write_lup_profile<W: Write>(writer: &mut csv::Writer<W>, path: &LupPath) -> Result<()> {
    writer.write_record(["node", "length", "energy"])?;
    for point in &path.profile {
        writer.write_record([
            point.node.to_string(),
            fixed12(&point.length),
            fixed12(&point.energy),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// AFIR 路径剖面: itr, length, energy
pub fn write_afir_profile<W: Write>(writer: &mut csv::Writer<W>, path: &AfirPath) -> Result<()> {
    writer.write_record(["itr", "length", "energy"])?;
    for point in &path.points {
        writer.write_record([
            point.itr.to_string(),
            fixed12(&point.length),
            fixed12(&point.energy),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// 优化收敛历史: 每迭代一行，四项指标带阈值
pub fn write_opt_convergence<W: Write>(writer: &mut csv::Writer<W>, job: &OptJob) -> Result<()> {
    writer.write_record([
        "itr",
        "energy",
        "maximum_force",
        "maximum_force_threshold",
        "rms_force",
        "rms_force_threshold",
        "maximum_displacement",
        "maximum_displacement_threshold",
        "rms_displacement",
        "rms_displacement_threshold",
    ])?;
    for (i, iteration) in job.iterations.iter().enumerate() {
        let m = &iteration.metrics;
        writer.write_record([
            i.to_string(),
            fixed12(&iteration.energy),
            fixed12(&m.maximum_force.value),
            fixed12(&m.maximum_force.threshold),
            fixed12(&m.rms_force.value),
            fixed12(&m.rms_force.threshold),
            fixed12(&m.maximum_displacement.value),
            fixed12(&m.maximum_displacement.threshold),
            fixed12(&m.rms_displacement.value),
            fixed12(&m.rms_displacement.threshold),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// 热化学数据: 每条 (温度, 压力) 记录一行
pub fn write_thermal_table<W: Write>(writer: &mut csv::Writer<W>, job: &FreqJob) -> Result<()> {
    writer.write_record([
        "temperature",
        "pressure",
        "e_el",
        "zpve",
        "h_zero",
        "e_tr",
        "e_rot",
        "e_vib",
        "h_corr",
        "h",
        "s_el",
        "s_tr",
        "s_rot",
        "s_vib",
        "g_corr",
        "g",
    ])?;
    for thermal in &job.thermal_data {
        writer.write_record([
            thermal.temperature.to_string(),
            thermal.pressure.to_string(),
            fixed12(&thermal.e_el),
            fixed12(&thermal.zpve),
            fixed12(&thermal.h_zero),
            fixed12(&thermal.e_tr),
            fixed12(&thermal.e_rot),
            fixed12(&thermal.e_vib),
            fixed12(&thermal.h_corr),
            fixed12(&thermal.h),
            fixed12(&thermal.s_el),
            fixed12(&thermal.s_tr),
            fixed12(&thermal.s_rot),
            fixed12(&thermal.s_vib),
            fixed12(&thermal.g_corr),
            fixed12(&thermal.g),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// 打开目标路径上的 CSV writer
pub fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    Ok(csv::Writer::from_path(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::irc::ProfilePoint;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut csv::Writer<Vec<u8>>) -> Result<()>,
    {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write(&mut writer).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_irc_profile_rows() {
        let job = IrcJob {
            name: None,
            num_atom: 0,
            init_structure: crate::models::Structure::from_lines::<&str>(&[], None, None).unwrap(),
            init_freq_job: None,
            paths: Vec::new(),
            profile: vec![ProfilePoint {
                length: Decimal::from_str("0.1").unwrap(),
                energy: Decimal::from_str("-1.5").unwrap(),
            }],
        };
        let out = render(|w| write_irc_profile(w, &job));
        assert_eq!(
            out,
            "length,energy\n0.100000000000,-1.500000000000\n"
        );
    }

    #[test]
    fn test_lup_profile_rows() {
        let path = LupPath {
            name: "ITR. 0".to_string(),
            num_atom: 0,
            nodes: Vec::new(),
            profile: vec![crate::models::LupProfilePoint {
                node: 3,
                length: Decimal::from_str("1.25").unwrap(),
                energy: Decimal::from_str("-2").unwrap(),
            }],
        };
        let out = render(|w| write_lup_profile(w, &path));
        assert_eq!(
            out,
            "node,length,energy\n3,1.250000000000,-2.000000000000\n"
        );
    }
}
