//! 分数解析阶段 - 流程层
//!
//! 只针对名称阶段留下的 ID 查询分数。
//! 同一类别的两个测试场景依次执行，不交叉

use std::sync::Arc;

use tracing::{error, warn};

use crate::clients::LookupClient;
use crate::error::AppError;
use crate::infrastructure::{FetchPool, Outcome};
use crate::models::{MetricKey, RecordStore};
use crate::utils::logging::{log_progress, log_stage_complete, log_stage_start};
use crate::workflow::StageStats;

pub struct ScoreResolutionStage {
    client: Arc<dyn LookupClient>,
}

impl ScoreResolutionStage {
    pub fn new(client: Arc<dyn LookupClient>) -> Self {
        Self { client }
    }

    /// 依次解析该存储类别的全部测试场景
    pub async fn run(&self, pool: &FetchPool, store: &mut RecordStore) -> Vec<StageStats> {
        let mut all_stats = Vec::new();
        for metric in store.category().metrics() {
            all_stats.push(self.run_metric(pool, store, metric).await);
        }
        all_stats
    }

    /// 解析单个测试场景
    ///
    /// 成功时覆盖占位值；失败时保留占位值，只记录日志
    pub async fn run_metric(
        &self,
        pool: &FetchPool,
        store: &mut RecordStore,
        metric: MetricKey,
    ) -> StageStats {
        let stage = metric.label().to_string();
        let ids = store.ids();
        log_stage_start(&stage, ids.len());

        let tasks = ids.iter().copied().map(|id| {
            let client = self.client.clone();
            async move {
                let (_, score) = client.resolve_median_score(metric, id).await?;
                Ok::<_, AppError>((id, score))
            }
        });
        let mut batch = pool.submit(tasks);
        let mut stats = StageStats::new(stage, batch.total());

        while let Some(outcome) = batch.next().await {
            match outcome {
                Outcome::Success { value: (id, score), .. } => {
                    match store.update_score(id, metric, score) {
                        Ok(()) => stats.resolved += 1,
                        Err(e) => {
                            // 只会提交已存在的 ID，走到这里说明存储被意外修改
                            error!("{} #{} 分数写入失败: {}", metric.category(), id, e);
                            stats.failed += 1;
                        }
                    }
                }
                Outcome::Failed { index, error } => {
                    match ids.get(index) {
                        Some(id) => warn!(
                            "[{}] {} #{} 查询失败: {}",
                            metric,
                            metric.category(),
                            id,
                            error
                        ),
                        None => warn!("[{}] 任务 {} 查询失败: {}", metric, index, error),
                    }
                    stats.failed += 1;
                }
            }
            log_progress(&stats.stage, stats.processed(), stats.submitted, pool.progress());
        }

        log_stage_complete(&stats);
        stats
    }
}
