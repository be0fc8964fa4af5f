//! # analyze 子命令 CLI 定义
//!
//! 单个 GRRM 日志的作业摘要。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/analyze.rs`

use clap::Args;
use std::path::PathBuf;

/// analyze 子命令参数
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the GRRM log file
    pub log_file: PathBuf,

    /// Path to the matching .com input file (auto-detected when omitted)
    #[arg(long)]
    pub com_file: Option<PathBuf>,

    /// Print the full thermochemistry table for FREQ jobs
    #[arg(long, default_value_t = false)]
    pub thermal: bool,
}
