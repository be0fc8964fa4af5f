//! # collect 子命令 CLI 定义
//!
//! 目录批量解析与汇总。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/collect.rs`

use clap::Args;
use std::path::PathBuf;

/// collect 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Directory (or single file) containing GRRM log files
    pub input: PathBuf,

    /// Filename patterns, comma separated (e.g. '*_EQ*.log,*_TS*.log')
    #[arg(long, default_value = "*.log")]
    pub pattern: String,

    /// Search subdirectories recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = all CPU cores)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Write the summary table to a CSV file
    #[arg(long)]
    pub output_csv: Option<PathBuf>,
}
