//! 批次合并服务 - 业务能力层
//!
//! 把多次抓取得到的记录存储合并成一个，后加载的覆盖先加载的

use crate::error::{AppResult, StoreError};
use crate::models::RecordStore;
use tracing::{debug, info};

/// 批次合并服务
///
/// 职责：
/// - 按加载顺序合并，同一 ID 以最后一个批次为准（整条替换）
/// - 拒绝合并不同类别的批次
pub struct BatchMerger {
    merged: Option<RecordStore>,
    batches: usize,
}

impl BatchMerger {
    pub fn new() -> Self {
        Self {
            merged: None,
            batches: 0,
        }
    }

    /// 合并下一个批次
    pub fn push(&mut self, store: RecordStore) -> AppResult<()> {
        self.batches += 1;
        debug!(
            "合并第 {} 批: {} 条 {} 记录",
            self.batches,
            store.len(),
            store.category()
        );

        match self.merged.as_mut() {
            Some(merged) => merged.merge(store)?,
            None => self.merged = Some(store),
        }
        Ok(())
    }

    /// 已合并的批次数
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// 结束合并，没有任何批次时返回错误
    pub fn finish(self) -> AppResult<RecordStore> {
        let merged = self.merged.ok_or(StoreError::EmptyInput)?;
        info!(
            "✓ 合并完成: {} 个批次, 共 {} 条 {} 记录",
            self.batches,
            merged.len(),
            merged.category()
        );
        Ok(merged)
    }
}

impl Default for BatchMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// 一次性合并多个批次
pub fn merge_batches(stores: impl IntoIterator<Item = RecordStore>) -> AppResult<RecordStore> {
    let mut merger = BatchMerger::new();
    for store in stores {
        merger.push(store)?;
    }
    merger.finish()
}
