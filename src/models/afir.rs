//! # AFIR 路径数据模型
//!
//! "---Profile of AFIR path" 总结段落：(迭代, 路径长度, 能量) 点列
//! 和路径沿线的近似端点/TS 候选结构。每个日志最多一个。
//!
//! ## 依赖关系
//! - 被 `parsers/afir.rs` 构造
//! - 被 `commands/`, `export/`, `plot/` 只读使用

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::structure::Structure;

/// AFIR 路径剖面点 (迭代号, 长度, 能量)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfirProfilePoint {
    pub itr: usize,
    pub length: Decimal,
    pub energy: Decimal,
}

/// AFIR 路径上的近似结构（名称保存在 `structure.name`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfirApproximate {
    pub structure: Structure,
    pub energy: Decimal,
}

/// AFIR 路径总结记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfirPath {
    pub points: Vec<AfirProfilePoint>,
    pub approximate_structures: Vec<AfirApproximate>,
}
