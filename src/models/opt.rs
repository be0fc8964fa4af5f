//! # 几何优化作业数据模型
//!
//! 保存一次几何优化的逐迭代记录（结构、能量、收敛指标）、
//! 收敛后的结构快照和终止状态。构造后不可变。
//!
//! ## 依赖关系
//! - 被 `parsers/opt.rs` 构造
//! - 被 `commands/`, `export/`, `plot/` 只读使用

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::structure::Structure;

/// 能量分解 (e1 : e2)
///
/// 仅 GRRM23 输出中存在；GRRM17 日志不打印该字段，此时为 `None`
/// 而不是 0 值（区分"缺失"与"恰好为零"）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyDecomposition {
    pub e1: Decimal,
    pub e2: Decimal,
}

/// 单个收敛指标的 (值, 阈值)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricValue {
    pub value: Decimal,
    pub threshold: Decimal,
}

impl MetricValue {
    /// 收敛判定: 值 <= 阈值
    pub fn converged(&self) -> bool {
        self.value <= self.threshold
    }
}

/// 一次优化迭代的四个收敛指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceMetrics {
    pub maximum_force: MetricValue,
    pub rms_force: MetricValue,
    pub maximum_displacement: MetricValue,
    pub rms_displacement: MetricValue,
}

impl ConvergenceMetrics {
    /// 四项指标全部收敛
    pub fn all_converged(&self) -> bool {
        self.maximum_force.converged()
            && self.rms_force.converged()
            && self.maximum_displacement.converged()
            && self.rms_displacement.converged()
    }
}

/// 一次优化迭代记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptIteration {
    pub structure: Structure,
    pub energy: Decimal,
    pub decomposition: Option<EnergyDecomposition>,
    pub spin2: Decimal,
    /// shift parameter (LAMDA 行)
    pub lambda: Decimal,
    pub trust_radius: Decimal,
    pub step_radius: Decimal,
    pub metrics: ConvergenceMetrics,
}

/// 收敛后的结构快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedPoint {
    pub structure: Structure,
    pub energy: Decimal,
    pub decomposition: Option<EnergyDecomposition>,
    pub spin2: Decimal,
}

/// 优化作业终止状态（闭集）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptStatus {
    Unfinished,
    MinFound,
    SaddleFound,
    StationaryFound,
    Dissociate,
    NotConverged,
}

impl std::fmt::Display for OptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptStatus::Unfinished => write!(f, "unfinished"),
            OptStatus::MinFound => write!(f, "MIN found"),
            OptStatus::SaddleFound => write!(f, "SADDLE found"),
            OptStatus::StationaryFound => write!(f, "Stationary point found"),
            OptStatus::Dissociate => write!(f, "dissociate"),
            OptStatus::NotConverged => write!(f, "not converged"),
        }
    }
}

/// 几何优化作业
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptJob {
    pub name: Option<String>,
    pub num_atom: usize,
    pub iterations: Vec<OptIteration>,
    pub optimized: Option<OptimizedPoint>,
    pub status: OptStatus,
}

impl OptJob {
    /// 迭代能量序列 (绘图用)
    pub fn energy_series(&self) -> Vec<Decimal> {
        self.iterations.iter().map(|it| it.energy).collect()
    }

    /// 最后一次迭代
    pub fn last_iteration(&self) -> Option<&OptIteration> {
        self.iterations.last()
    }
}
