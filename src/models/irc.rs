//! # 反应路径 (IRC) 作业数据模型
//!
//! 初始结构、可选的初始频率子作业、前向/后向路径段
//! （各自可内嵌优化/频率精修子作业）以及路径长度-能量剖面。
//!
//! ## 依赖关系
//! - 被 `parsers/irc.rs` 构造
//! - 被 `commands/`, `export/`, `plot/` 只读使用

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{GrrmKitError, Result};
use crate::models::freq::FreqJob;
use crate::models::opt::OptJob;
use crate::models::structure::Structure;

/// 路径跟踪模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowingMode {
    /// IRC FOLLOWING
    Irc,
    /// SOFTEST MODE FOLLOWING
    Softest,
    /// STEEPEST-DESCENT PATH FOLLOWING (非驻点起始)
    Nsp,
}

/// 路径方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathDirection {
    Forward,
    Backward,
}

impl std::fmt::Display for PathDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathDirection::Forward => write!(f, "forward"),
            PathDirection::Backward => write!(f, "backward"),
        }
    }
}

/// 路径上的一个步点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrcStep {
    pub structure: Structure,
    pub energy: Decimal,
    pub spin2: Decimal,
}

/// 一段 IRC 路径（单方向）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrcPath {
    pub mode: FollowingMode,
    pub direction: PathDirection,
    pub steps: Vec<IrcStep>,
    /// 路径终点的优化精修子作业
    pub opt_job: Option<OptJob>,
    /// 路径终点的频率精修子作业
    pub freq_job: Option<FreqJob>,
}

/// 长度-能量剖面点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub length: Decimal,
    pub energy: Decimal,
}

/// IRC 作业
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrcJob {
    pub name: Option<String>,
    pub num_atom: usize,
    pub init_structure: Structure,
    pub init_freq_job: Option<FreqJob>,
    pub paths: Vec<IrcPath>,
    /// "Energy profile along IRC" 段落；缺失时为空
    pub profile: Vec<ProfilePoint>,
}

impl IrcJob {
    /// 取得 (forward, backward) 路径对
    ///
    /// 完整路径导出要求恰好两段、方向互补，否则是日志一致性错误。
    pub fn forward_backward_pair(&self) -> Result<(&IrcPath, &IrcPath)> {
        if self.paths.len() == 2 {
            match (self.paths[0].direction, self.paths[1].direction) {
                (PathDirection::Forward, PathDirection::Backward) => {
                    return Ok((&self.paths[0], &self.paths[1]));
                }
                (PathDirection::Backward, PathDirection::Forward) => {
                    return Ok((&self.paths[1], &self.paths[0]));
                }
                _ => {}
            }
        }
        Err(GrrmKitError::Consistency(
            "both forward and backward IRC paths are required for full-path export".to_string(),
        ))
    }
}
