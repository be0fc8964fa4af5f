//! # 日志文件收集器
//!
//! 根据输入路径和 glob 模式收集待解析的日志文件。
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 调用
//! - 使用 `walkdir` 遍历目录, `glob` 做文件名匹配

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 日志文件收集器
pub struct LogCollector {
    input: PathBuf,
    /// 文件名匹配模式（逗号分隔多模式）
    patterns: Vec<Pattern>,
    recursive: bool,
}

impl LogCollector {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: vec![Pattern::new("*.log").unwrap()],
            recursive: false,
        }
    }

    /// 设置匹配模式；非法模式静默丢弃，全部非法时退回 "*.log"
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        let patterns: Vec<Pattern> = pattern
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| Pattern::new(s).ok())
            .collect();
        if !patterns.is_empty() {
            self.patterns = patterns;
        }
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件，按路径排序
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }
        if !self.input.is_dir() {
            return Vec::new();
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matches(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }

    fn matches(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        self.patterns.iter().any(|p| p.matches(filename))
    }

    /// 显示用的模式串
    pub fn pattern_string(&self) -> String {
        self.patterns
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern_matches_logs() {
        let collector = LogCollector::new(PathBuf::from("."));
        assert!(collector.matches(Path::new("foo.log")));
        assert!(collector.matches(Path::new("dir/foo_TS3.log")));
        assert!(!collector.matches(Path::new("foo.com")));
    }

    #[test]
    fn test_multi_pattern() {
        let collector = LogCollector::new(PathBuf::from(".")).with_pattern("*_EQ*.log, *_TS*.log");
        assert!(collector.matches(Path::new("job_EQ0.log")));
        assert!(collector.matches(Path::new("job_TS12.log")));
        assert!(!collector.matches(Path::new("job.log")));
    }

    #[test]
    fn test_invalid_pattern_falls_back() {
        let collector = LogCollector::new(PathBuf::from(".")).with_pattern("[");
        assert!(collector.matches(Path::new("foo.log")));
    }
}
