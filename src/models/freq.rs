//! # 振动频率作业数据模型
//!
//! 平衡结构、简正模式（频率 + 位移矩阵）和不同温度/压力条件下的
//! 热化学数据。位移矩阵用于振动动画导出，以 f64 保存。
//!
//! ## 依赖关系
//! - 被 `parsers/freq.rs` 构造
//! - 被 `commands/`, `export/` 只读使用

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::structure::Structure;

/// 单个 (温度, 压力) 条件下的热化学数据
///
/// 各字段按日志中的固定行序解析；温度/压力无法识别时为 -1（未知哨兵值）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalData {
    /// 原始 Thermochemistry 标题行（压缩多余空白后）
    pub header: String,
    pub temperature: Decimal,
    pub pressure: Decimal,
    /// 电子能量 E(el)
    pub e_el: Decimal,
    /// 零点振动能 ZPVE
    pub zpve: Decimal,
    /// 0K 焓 Enthalpie(0K)
    pub h_zero: Decimal,
    pub e_tr: Decimal,
    pub e_rot: Decimal,
    pub e_vib: Decimal,
    /// 焓修正 H-E(el)
    pub h_corr: Decimal,
    /// 焓 Enthalpie
    pub h: Decimal,
    pub s_el: Decimal,
    pub s_tr: Decimal,
    pub s_rot: Decimal,
    pub s_vib: Decimal,
    /// 自由能修正 G-E(el)
    pub g_corr: Decimal,
    /// 自由能 Free Energy
    pub g: Decimal,
}

/// 一个简正模式的位移矩阵（每原子一个 xyz 位移向量）
pub type ModeMatrix = Vec<[f64; 3]>;

/// 振动频率作业
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreqJob {
    pub name: Option<String>,
    pub num_atom: usize,
    /// 平衡结构（质心原点坐标）
    pub init_structure: Structure,
    /// 频率值 (cm^-1, 带符号)
    pub frequencies: Vec<Decimal>,
    /// 位移矩阵，与 `frequencies` 一一对应
    pub mode_matrices: Vec<ModeMatrix>,
    pub thermal_data: Vec<ThermalData>,
}

impl FreqJob {
    /// 虚频数（频率 < 0）
    pub fn num_imaginary(&self) -> usize {
        self.frequencies.iter().filter(|f| f.is_sign_negative()).count()
    }

    /// 模式数
    pub fn num_modes(&self) -> usize {
        self.frequencies.len()
    }
}
