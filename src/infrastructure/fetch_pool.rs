//! 并发抓取池 - 基础设施层
//!
//! 持有并发许可（Semaphore），只暴露"并发执行一批任务"的能力

use crate::error::{AppError, AppResult, ConfigError, TaskError};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::error;

/// 单个任务的执行结果
///
/// `index` 为任务在提交序列中的位置，结果按完成顺序到达，
/// 调用方应通过任务自身携带的值（ID 等）来对应，而不是依赖顺序
#[derive(Debug)]
pub enum Outcome<T> {
    Success { index: usize, value: T },
    Failed { index: usize, error: AppError },
}

impl<T> Outcome<T> {
    pub fn index(&self) -> usize {
        match self {
            Outcome::Success { index, .. } | Outcome::Failed { index, .. } => *index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn into_result(self) -> AppResult<T> {
        match self {
            Outcome::Success { value, .. } => Ok(value),
            Outcome::Failed { error, .. } => Err(error),
        }
    }
}

/// 进度快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub submitted: usize,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.completed, self.submitted)
    }
}

/// 并发抓取池
///
/// 职责：
/// - 用固定数量的许可限制同时运行的任务数
/// - 单个任务失败（包括 panic）不影响其他任务
/// - 暴露单调递增的完成计数，供进度展示使用
/// - 不认识设备 / 分数，不修改任何共享数据
pub struct FetchPool {
    semaphore: Arc<Semaphore>,
    max_workers: usize,
    submitted: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
}

impl FetchPool {
    /// 创建指定并发数的抓取池
    pub fn new(max_workers: usize) -> AppResult<Self> {
        if max_workers == 0 {
            return Err(ConfigError::ZeroWorkers.into());
        }
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            submitted: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// 并发数等于可用的处理器数量
    pub fn with_available_parallelism() -> Self {
        let workers = default_worker_count();
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            max_workers: workers,
            submitted: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// 池创建以来已提交的任务数
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::Relaxed)
    }

    /// 池创建以来已完成（成功或失败）的任务数
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.completed(),
            submitted: self.submitted(),
        }
    }

    /// 提交一批任务
    ///
    /// 每个任务立即被 spawn，但只有拿到许可后才开始执行。
    /// 返回的 [`OutcomeBatch`] 按完成顺序产出结果；在取完之前被丢弃时，
    /// 剩余任务会被中止。
    pub fn submit<T, Fut>(&self, tasks: impl IntoIterator<Item = Fut>) -> OutcomeBatch<T>
    where
        T: Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        let mut set = JoinSet::new();
        let mut total = 0;

        for (index, task) in tasks.into_iter().enumerate() {
            let semaphore = self.semaphore.clone();
            set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        let error = TaskError::Aborted {
                            index,
                            message: e.to_string(),
                        };
                        return (index, Err(error.into()));
                    }
                };

                match AssertUnwindSafe(task).catch_unwind().await {
                    Ok(result) => (index, result),
                    Err(panic) => {
                        let error = TaskError::Aborted {
                            index,
                            message: panic_message(panic.as_ref()),
                        };
                        (index, Err(error.into()))
                    }
                }
            });
            total += 1;
        }

        self.submitted.fetch_add(total, Ordering::Relaxed);

        OutcomeBatch {
            set,
            total,
            received: 0,
            completed: self.completed.clone(),
        }
    }
}

impl Default for FetchPool {
    fn default() -> Self {
        Self::with_available_parallelism()
    }
}

/// 一次提交对应的结果集合
pub struct OutcomeBatch<T> {
    set: JoinSet<(usize, AppResult<T>)>,
    total: usize,
    received: usize,
    completed: Arc<AtomicUsize>,
}

impl<T: Send + 'static> OutcomeBatch<T> {
    /// 等待下一个完成的任务，全部取完后返回 None
    pub async fn next(&mut self) -> Option<Outcome<T>> {
        loop {
            let joined = self.set.join_next().await?;
            self.received += 1;
            self.completed.fetch_add(1, Ordering::Relaxed);

            match joined {
                Ok((index, Ok(value))) => return Some(Outcome::Success { index, value }),
                Ok((index, Err(error))) => return Some(Outcome::Failed { index, error }),
                Err(e) => {
                    // 任务内部已捕获 panic，这里只会是外部中止
                    error!("任务被中止: {}", e);
                    continue;
                }
            }
        }
    }

    /// 取出全部结果
    pub async fn drain(mut self) -> Vec<Outcome<T>> {
        let mut outcomes = Vec::with_capacity(self.remaining());
        while let Some(outcome) = self.next().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// 本批任务总数
    pub fn total(&self) -> usize {
        self.total
    }

    /// 尚未取出的任务数
    pub fn remaining(&self) -> usize {
        self.total - self.received
    }
}

/// 默认并发数
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知 panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::assert_ok;

    #[test]
    fn test_zero_workers_rejected() {
        assert!(FetchPool::new(0).is_err());
        assert_ok!(FetchPool::new(1));
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let pool = FetchPool::new(2).unwrap();
        let tasks = (0..6u32).map(|i| async move {
            if i % 3 == 0 {
                Err(AppError::Other(format!("boom {}", i)))
            } else {
                Ok(i * 10)
            }
        });

        let outcomes = pool.submit(tasks).drain().await;
        assert_eq!(outcomes.len(), 6);

        let mut values: Vec<u32> = outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Success { value, .. } => Some(*value),
                Outcome::Failed { .. } => None,
            })
            .collect();
        values.sort_unstable();
        assert_eq!(values, vec![10, 20, 40, 50]);

        let mut failed: Vec<usize> = outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(Outcome::index)
            .collect();
        failed.sort_unstable();
        assert_eq!(failed, vec![0, 3]);
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_outcome() {
        let pool = FetchPool::new(4).unwrap();
        let tasks = (0..3u32).map(|i| async move {
            if i == 1 {
                panic!("task {} exploded", i);
            }
            Ok(i)
        });

        let outcomes = pool.submit(tasks).drain().await;
        assert_eq!(outcomes.len(), 3);
        let failed: Vec<_> = outcomes.into_iter().filter(|o| !o.is_success()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].index(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = FetchPool::new(3).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..20).map(|_| {
            let running = running.clone();
            let peak = peak.clone();
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        });

        pool.submit(tasks).drain().await;
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_progress_counters_accumulate() {
        let pool = FetchPool::new(2).unwrap();
        assert_eq!(pool.progress(), Progress::default());

        let mut batch = pool.submit((0..4).map(|i| async move { Ok(i) }));
        assert_eq!(batch.total(), 4);
        assert_eq!(pool.submitted(), 4);

        let mut last = pool.completed();
        while batch.next().await.is_some() {
            assert!(pool.completed() > last);
            last = pool.completed();
        }
        assert_eq!(batch.remaining(), 0);

        pool.submit((0..2).map(|i| async move { Ok(i) })).drain().await;
        assert_eq!(pool.progress(), Progress { completed: 6, submitted: 6 });
    }
}
