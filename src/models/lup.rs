//! # LUP 路径优化作业数据模型
//!
//! 逐迭代的节点链（结构 + 能量 + 路径剖面）、全局收集的近似 TS/EQ 结构
//! 以及按近似结构分组的命名子作业（opt/freq/irc）。
//!
//! ## 依赖关系
//! - 被 `parsers/lup.rs` 构造
//! - 被 `commands/`, `export/`, `plot/` 只读使用

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::job::Job;
use crate::models::structure::Structure;

/// 路径节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LupNode {
    pub structure: Structure,
    pub energy: Decimal,
}

/// LUP 路径剖面点 (节点号, 长度, 能量)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LupProfilePoint {
    pub node: usize,
    pub length: Decimal,
    pub energy: Decimal,
}

/// 一次 LUP 路径优化迭代
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LupPath {
    /// "ITR. n" 名称
    pub name: String,
    pub num_atom: usize,
    pub nodes: Vec<LupNode>,
    pub profile: Vec<LupProfilePoint>,
}

impl LupPath {
    pub fn num_node(&self) -> usize {
        self.nodes.len()
    }
}

/// 近似结构类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApproximateKind {
    Ts,
    Eq,
}

impl std::fmt::Display for ApproximateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApproximateKind::Ts => write!(f, "TS"),
            ApproximateKind::Eq => write!(f, "EQ"),
        }
    }
}

/// 路径上估计出的近似 TS/EQ 结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproximateStructure {
    pub kind: ApproximateKind,
    /// 同类型内从 0 起的序号
    pub index: usize,
    pub structure: Structure,
    pub energy: Decimal,
}

/// LUP 路径优化作业
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LupJob {
    pub name: Option<String>,
    pub num_atom: usize,
    pub iterations: Vec<LupPath>,
    pub approximate_structures: Vec<ApproximateStructure>,
    /// 每个近似结构的精修子作业（opt/freq/irc，带组名）
    pub sub_jobs: Vec<Job>,
}
