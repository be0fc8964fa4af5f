//! # 工具模块
//!
//! 终端输出样式与进度条封装。
//!
//! ## 依赖关系
//! - 被 `main.rs`, `commands/` 使用
//! - 子模块: output, progress

pub mod output;
pub mod progress;
