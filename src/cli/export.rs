//! # export 子命令 CLI 定义
//!
//! XYZ 轨迹与 CSV 数据表导出。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/export.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 导出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    /// Optimization trajectory (XYZ)
    OptTrajectory,
    /// Full IRC path: backward + initial + forward (XYZ)
    IrcPath,
    /// LUP node chain of one iteration (XYZ)
    LupNodes,
    /// Approximate TS/EQ structures from a LUP job or the AFIR summary (XYZ)
    Approximate,
    /// Normal mode vibration animation (XYZ)
    ModeAnimation,
    /// IRC energy profile (CSV)
    IrcProfile,
    /// LUP path profile of one iteration (CSV)
    LupProfile,
    /// AFIR path profile (CSV)
    AfirProfile,
    /// Optimization convergence history (CSV)
    Convergence,
    /// Thermochemistry table (CSV)
    Thermal,
}

impl ExportTarget {
    /// 默认输出文件的扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            ExportTarget::OptTrajectory
            | ExportTarget::IrcPath
            | ExportTarget::LupNodes
            | ExportTarget::Approximate
            | ExportTarget::ModeAnimation => "xyz",
            _ => "csv",
        }
    }

    /// 默认输出文件名的后缀
    pub fn suffix(&self) -> &'static str {
        match self {
            ExportTarget::OptTrajectory => "trajectory",
            ExportTarget::IrcPath => "irc_path",
            ExportTarget::LupNodes => "lup_nodes",
            ExportTarget::Approximate => "approximate",
            ExportTarget::ModeAnimation => "mode",
            ExportTarget::IrcProfile => "irc_profile",
            ExportTarget::LupProfile => "lup_profile",
            ExportTarget::AfirProfile => "afir_profile",
            ExportTarget::Convergence => "convergence",
            ExportTarget::Thermal => "thermal",
        }
    }
}

/// export 子命令参数
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the GRRM log file
    pub log_file: PathBuf,

    /// What to export
    #[arg(long, value_enum)]
    pub target: ExportTarget,

    /// Output file (default: '<log stem>_<target>.<ext>')
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Path to the matching .com input file (auto-detected when omitted)
    #[arg(long)]
    pub com_file: Option<PathBuf>,

    /// Index of the job inside the log (document order, 0-based)
    #[arg(long, default_value_t = 0)]
    pub job: usize,

    /// LUP iteration index (default: last iteration)
    #[arg(long)]
    pub iteration: Option<usize>,

    /// Truncate the LUP node chain to 'start-end' (inclusive, 0-based)
    #[arg(long)]
    pub node_range: Option<String>,

    /// Reverse the frame order of the IRC path
    #[arg(long, default_value_t = false)]
    pub reverse: bool,

    /// Normal mode index for the animation (0-based)
    #[arg(long, default_value_t = 0)]
    pub mode: usize,

    /// Maximum atomic displacement of the animation (Angstrom)
    #[arg(long, default_value_t = 0.3)]
    pub max_shift: f64,

    /// Frames per quarter period of the animation
    #[arg(long, default_value_t = 5)]
    pub step: usize,
}
