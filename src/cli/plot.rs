//! # plot 子命令 CLI 定义
//!
//! 能量剖面与收敛历史图表。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/plot.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 图表类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlotKind {
    /// IRC length-energy profile
    IrcProfile,
    /// LUP path profile of one iteration
    LupProfile,
    /// AFIR path profile
    AfirProfile,
    /// Optimization energy history
    OptEnergy,
    /// 2x2 convergence metric panels
    Convergence,
}

impl PlotKind {
    /// 默认输出文件名的后缀
    pub fn suffix(&self) -> &'static str {
        match self {
            PlotKind::IrcProfile => "irc_profile",
            PlotKind::LupProfile => "lup_profile",
            PlotKind::AfirProfile => "afir_profile",
            PlotKind::OptEnergy => "opt_energy",
            PlotKind::Convergence => "convergence",
        }
    }
}

/// plot 子命令参数
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Path to the GRRM log file
    pub log_file: PathBuf,

    /// What to plot
    #[arg(long, value_enum)]
    pub kind: PlotKind,

    /// Output image file (default: '<log stem>_<kind>.png')
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

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Render SVG instead of PNG
    #[arg(long, default_value_t = false)]
    pub svg: bool,
}
