//! # 批量处理模块
//!
//! 日志文件的收集与并行解析。
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::LogCollector;
pub use runner::{BatchOutcome, BatchRunner};
