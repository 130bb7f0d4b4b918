//! 名称解析阶段 - 流程层
//!
//! 遍历 ID 范围内的每一个 ID，查询设备名称；
//! 名称为空的 ID 视为不存在，直接丢弃

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::LookupClient;
use crate::error::AppError;
use crate::infrastructure::{FetchPool, Outcome};
use crate::models::{DeviceRecord, IdSpace, RecordStore};
use crate::utils::logging::{log_progress, log_stage_complete, log_stage_start, truncate_text};
use crate::workflow::StageStats;

pub struct NameResolutionStage {
    client: Arc<dyn LookupClient>,
}

impl NameResolutionStage {
    pub fn new(client: Arc<dyn LookupClient>) -> Self {
        Self { client }
    }

    /// 解析整个 ID 范围，返回只包含存在设备的存储
    ///
    /// 单个查询失败只记录日志，该 ID 等同于不存在，不重试
    pub async fn run(&self, pool: &FetchPool, space: &IdSpace) -> (RecordStore, StageStats) {
        let category = space.category();
        let stage = format!(
            "{} 名称 ({} - {})",
            category,
            space.lower_bound(),
            space.upper_bound()
        );
        log_stage_start(&stage, space.len());

        let tasks = space.ids().map(|id| {
            let client = self.client.clone();
            async move {
                let (_, name) = client.resolve_name(id, category).await?;
                Ok::<_, AppError>((id, name))
            }
        });
        let mut batch = pool.submit(tasks);

        let mut store = RecordStore::new(category);
        let mut stats = StageStats::new(stage, batch.total());

        while let Some(outcome) = batch.next().await {
            match outcome {
                Outcome::Success { value: (id, name), .. } => {
                    let name = name.trim();
                    if name.is_empty() {
                        stats.not_found += 1;
                    } else {
                        debug!("{} #{}: {}", category, id, truncate_text(name, 35));
                        match store.insert(DeviceRecord::new(category, id, name)) {
                            Ok(_) => stats.resolved += 1,
                            Err(e) => {
                                warn!("{} #{} 写入失败: {}", category, id, e);
                                stats.failed += 1;
                            }
                        }
                    }
                }
                Outcome::Failed { index, error } => {
                    match space.id_at(index) {
                        Some(id) => warn!("{} #{} 名称查询失败: {}", category, id, error),
                        None => warn!("{} 任务 {} 名称查询失败: {}", category, index, error),
                    }
                    stats.failed += 1;
                }
            }
            log_progress(&stats.stage, stats.processed(), stats.submitted, pool.progress());
        }

        log_stage_complete(&stats);
        info!("找到 {} 个 {} 设备", store.len(), category);
        (store, stats)
    }
}
