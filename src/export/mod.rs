//! # 导出模块
//!
//! 解析结果的文件导出：XYZ 轨迹/动画和 CSV 数据表。
//! 所有导出先在内存中构造完整文本，再一次性写盘。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: xyz, csv

pub mod csv;
pub mod xyz;

use std::fs;
use std::path::Path;

use crate::error::{GrrmKitError, Result};

/// 写出文本文件
pub fn write_text_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| GrrmKitError::FileWriteError {
        path: path.display().to_string(),
        source,
    })
}
