//! # 数据模型模块
//!
//! 定义结构、作业和路径记录的数据模型。所有对象构造后不可变，
//! 由解析器产出、前端只读消费。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `commands/`, `export/`, `plot/` 使用
//! - 子模块: structure, opt, freq, irc, lup, afir, job

pub mod afir;
pub mod freq;
pub mod irc;
pub mod job;
pub mod lup;
pub mod opt;
pub mod structure;

pub use afir::{AfirApproximate, AfirPath, AfirProfilePoint};
pub use freq::{FreqJob, ModeMatrix, ThermalData};
pub use irc::{FollowingMode, IrcJob, IrcPath, IrcStep, PathDirection, ProfilePoint};
pub use job::{GrrmLog, Job, JobKind};
pub use lup::{ApproximateKind, ApproximateStructure, LupJob, LupNode, LupPath, LupProfilePoint};
pub use opt::{
    ConvergenceMetrics, EnergyDecomposition, MetricValue, OptIteration, OptJob, OptStatus,
    OptimizedPoint,
};
pub use structure::{fixed12, AtomCoord, Structure};
