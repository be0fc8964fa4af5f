//! # 作业图数据模型
//!
//! 四种作业类型的统一枚举和整份日志的顶层解析结果。
//! 作业顺序保持文档顺序（即执行顺序），所有嵌套对象由父记录独占。
//!
//! ## 依赖关系
//! - 被 `parsers/log.rs` 构造
//! - 被 `commands/`, `export/`, `plot/` 只读使用

use serde::{Deserialize, Serialize};

use crate::models::afir::AfirPath;
use crate::models::freq::FreqJob;
use crate::models::irc::IrcJob;
use crate::models::lup::LupJob;
use crate::models::opt::OptJob;

/// 作业类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
    Opt,
    Freq,
    Irc,
    Lup,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Opt => write!(f, "OPT"),
            JobKind::Freq => write!(f, "FREQ"),
            JobKind::Irc => write!(f, "IRC"),
            JobKind::Lup => write!(f, "LUP"),
        }
    }
}

/// 顶层作业
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Job {
    Opt(OptJob),
    Freq(FreqJob),
    Irc(IrcJob),
    Lup(LupJob),
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Job::Opt(_) => JobKind::Opt,
            Job::Freq(_) => JobKind::Freq,
            Job::Irc(_) => JobKind::Irc,
            Job::Lup(_) => JobKind::Lup,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Job::Opt(job) => job.name.as_deref(),
            Job::Freq(job) => job.name.as_deref(),
            Job::Irc(job) => job.name.as_deref(),
            Job::Lup(job) => job.name.as_deref(),
        }
    }

    pub fn set_name(&mut self, name: Option<String>) {
        match self {
            Job::Opt(job) => job.name = name,
            Job::Freq(job) => job.name = name,
            Job::Irc(job) => job.name = name,
            Job::Lup(job) => job.name = name,
        }
    }
}

/// 整份 GRRM 日志的解析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrrmLog {
    /// 顶层作业，按出现顺序
    pub jobs: Vec<Job>,

    /// "Normal termination of the GRRM Program" 标志
    pub normal_termination: bool,

    /// 可选的 AFIR 路径总结（每个日志最多一个）
    pub afir_path: Option<AfirPath>,
}
