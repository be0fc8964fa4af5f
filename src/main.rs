//! # GrrmKit - GRRM 反应路径日志统一分析工具箱
//!
//! 解析 GRRM 量子化学程序的日志文件（OPT / FREQ / IRC / LUP 作业与
//! AFIR 路径总结），提供摘要、批量收集、XYZ/CSV 导出和图表绘制。
//!
//! ## 子命令
//! - `analyze` - 单个日志的作业摘要
//! - `collect` - 目录批量解析与汇总
//! - `export`  - XYZ 轨迹 / CSV 数据表导出
//! - `plot`    - 能量剖面与收敛历史图表
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (日志/输入文件解析器)
//!   │     ├── models/    (作业图数据模型)
//!   │     ├── export/    (XYZ/CSV 导出)
//!   │     └── plot/      (图表渲染)
//!   ├── batch/      (并行批量处理)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod export;
mod models;
mod parsers;
mod plot;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
