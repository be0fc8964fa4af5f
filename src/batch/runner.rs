//! # 批量执行器
//!
//! 基于 rayon 的并行日志解析，进度条显示，逐文件收集结果。
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::progress;

/// 单个文件的处理结果
pub struct BatchOutcome<T> {
    pub path: PathBuf,
    pub result: Result<T>,
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器；`jobs == 0` 时使用全部 CPU 核心
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行处理文件列表，结果保持输入顺序
    pub fn run<T, F>(&self, files: Vec<PathBuf>, message: &str, processor: F) -> Vec<BatchOutcome<T>>
    where
        T: Send,
        F: Fn(&Path) -> Result<T> + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, message);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .unwrap();

        let outcomes: Vec<BatchOutcome<T>> = pool.install(|| {
            files
                .into_par_iter()
                .map(|path| {
                    let result = processor(&path);
                    pb.inc(1);
                    BatchOutcome { path, result }
                })
                .collect()
        });

        pb.finish_and_clear();
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrrmKitError;

    #[test]
    fn test_run_preserves_order_and_errors() {
        let files = vec![
            PathBuf::from("a.log"),
            PathBuf::from("b.log"),
            PathBuf::from("c.log"),
        ];
        let runner = BatchRunner::new(2);
        let outcomes = runner.run(files, "Parsing", |path| {
            if path.ends_with("b.log") {
                Err(GrrmKitError::Other("boom".to_string()))
            } else {
                Ok(path.display().to_string())
            }
        });

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].path, PathBuf::from("a.log"));
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert_eq!(outcomes[2].result.as_ref().unwrap(), "c.log");
    }
}
