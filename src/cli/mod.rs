//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `analyze`: 单个日志的作业摘要
//! - `collect`: 目录批量解析与汇总
//! - `export`: XYZ 轨迹 / CSV 数据表导出
//! - `plot`: 能量剖面与收敛历史图表
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: analyze, collect, export, plot

pub mod analyze;
pub mod collect;
pub mod export;
pub mod plot;

use clap::{Parser, Subcommand};

/// GrrmKit - GRRM 反应路径日志统一分析工具箱
#[derive(Parser)]
#[command(name = "grrmkit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "A unified GRRM reaction-path log analysis toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the jobs recorded in a GRRM log file
    Analyze(analyze::AnalyzeArgs),

    /// Parse a directory of GRRM logs in parallel and tabulate the results
    Collect(collect::CollectArgs),

    /// Export trajectories (XYZ) and data tables (CSV) from a log file
    Export(export::ExportArgs),

    /// Plot energy profiles and convergence histories (PNG/SVG)
    Plot(plot::PlotArgs),
}
