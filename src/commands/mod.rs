//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `export/`, `plot/`, `utils/`
//! - 子模块: analyze, collect, export, plot

pub mod analyze;
pub mod collect;
pub mod export;
pub mod plot;

use std::path::{Path, PathBuf};

use crate::cli::Commands;
use crate::error::{GrrmKitError, Result};
use crate::models::GrrmLog;
use crate::parsers::com::{find_parent_com_file, parse_com_file, ComFile};
use crate::parsers::log::parse_log_file;
use crate::utils::output;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Analyze(args) => analyze::execute(args),
        Commands::Collect(args) => collect::execute(args),
        Commands::Export(args) => export::execute(args),
        Commands::Plot(args) => plot::execute(args),
    }
}

/// 读取日志及其输入文件
///
/// 输入文件显式给出时必须可解析；未给出时按父作业名自动探测，
/// 探测不到则不带冻结原子解析。
pub(crate) fn load_log(
    log_file: &Path,
    com_file: Option<&Path>,
) -> Result<(GrrmLog, Option<ComFile>)> {
    if !log_file.is_file() {
        return Err(GrrmKitError::FileNotFound {
            path: log_file.display().to_string(),
        });
    }

    let com = match com_file {
        Some(path) => Some(parse_com_file(path)?),
        None => match find_parent_com_file(log_file) {
            Some(path) => Some(parse_com_file(&path)?),
            None => None,
        },
    };

    let frozen = com.as_ref().and_then(|c| c.frozen_atoms());
    let log = parse_log_file(log_file, frozen)?;
    Ok((log, com))
}

/// 默认输出路径: `<log stem>_<suffix>.<ext>`（与日志同目录）
pub(crate) fn default_output(log_file: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = log_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    log_file.with_file_name(format!("{}_{}.{}", stem, suffix, ext))
}

/// 打印正常/异常终止状态行
pub(crate) fn report_termination(log: &GrrmLog) {
    if log.normal_termination {
        output::print_success("Normal termination of the GRRM Program");
    } else {
        output::print_warning("The log does not record a normal termination");
    }
}
