//! 记录存储
//!
//! ID → 设备记录的内存映射，是整个流程中唯一的写入点。
//! 只有汇总方（消费任务结果的一方）会修改它，工作任务只返回值。

use crate::error::{AppResult, StoreError};
use crate::models::{Category, DeviceRecord, MetricKey};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore {
    category: Category,
    records: BTreeMap<u32, DeviceRecord>,
}

impl RecordStore {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            records: BTreeMap::new(),
        }
    }

    /// 从已解析的记录构建存储，所有记录必须属于同一类别
    ///
    /// 记录为空时返回 `Ok(None)`，因为无法确定类别
    pub fn from_records(
        records: impl IntoIterator<Item = DeviceRecord>,
    ) -> AppResult<Option<Self>> {
        let mut store: Option<RecordStore> = None;
        for record in records {
            let store = store.get_or_insert_with(|| RecordStore::new(record.category));
            store.insert(record)?;
        }
        Ok(store)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// 插入新记录，已存在的同 ID 记录被整体替换
    pub fn insert(&mut self, record: DeviceRecord) -> AppResult<Option<DeviceRecord>> {
        if record.category != self.category {
            return Err(StoreError::CategoryMismatch {
                expected: self.category,
                found: record.category,
            }
            .into());
        }
        Ok(self.records.insert(record.id, record))
    }

    /// 更新已有记录的分数，不会创建新记录
    pub fn update_score(&mut self, id: u32, metric: MetricKey, score: i64) -> AppResult<()> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(StoreError::UnknownId { id })?;
        record.set_score(metric, score)
    }

    /// 合并另一个存储，后合并的一方整体覆盖同 ID 记录
    pub fn merge(&mut self, other: RecordStore) -> AppResult<()> {
        if other.category != self.category {
            return Err(StoreError::MergeConflict {
                first: self.category,
                second: other.category,
            }
            .into());
        }
        self.records.extend(other.records);
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&DeviceRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.records.contains_key(&id)
    }

    /// 按 ID 升序返回所有 key
    pub fn ids(&self) -> Vec<u32> {
        self.records.keys().copied().collect()
    }

    /// 按 ID 升序遍历记录
    pub fn records(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.records.values()
    }

    pub fn as_map(&self) -> &BTreeMap<u32, DeviceRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_update_requires_existing_key() {
        let mut store = RecordStore::new(Category::Cpu);
        store
            .insert(DeviceRecord::new(Category::Cpu, 1, "Alpha"))
            .unwrap();

        store.update_score(1, MetricKey::CpuSingleCore, 100).unwrap();
        assert_eq!(store.get(1).unwrap().primary_score(), 100);

        let err = store.update_score(2, MetricKey::CpuSingleCore, 5).unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::UnknownId { id: 2 })));
        assert!(!store.contains(2));
    }

    #[test]
    fn test_insert_rejects_other_category() {
        let mut store = RecordStore::new(Category::Gpu);
        assert!(store
            .insert(DeviceRecord::new(Category::Cpu, 1, "Alpha"))
            .is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_merge_last_wins() {
        let mut first = RecordStore::new(Category::Cpu);
        first
            .insert(DeviceRecord::new(Category::Cpu, 42, "X").with_scores([10, 20]))
            .unwrap();
        first
            .insert(DeviceRecord::new(Category::Cpu, 1, "Keep"))
            .unwrap();

        let mut second = RecordStore::new(Category::Cpu);
        second
            .insert(DeviceRecord::new(Category::Cpu, 42, "Y"))
            .unwrap();

        first.merge(second).unwrap();
        let merged = first.get(42).unwrap();
        assert_eq!(merged.name, "Y");
        // 整体替换，不做字段级合并
        assert_eq!(merged.scores(), [-1, -1]);
        assert_eq!(first.ids(), vec![1, 42]);
    }

    #[test]
    fn test_merge_rejects_category_mismatch() {
        let mut cpu = RecordStore::new(Category::Cpu);
        let gpu = RecordStore::new(Category::Gpu);
        let err = cpu.merge(gpu).unwrap_err();
        assert!(matches!(
            err,
            AppError::Store(StoreError::MergeConflict { .. })
        ));
    }

    #[test]
    fn test_from_records_requires_single_category() {
        let mixed = vec![
            DeviceRecord::new(Category::Cpu, 1, "Alpha"),
            DeviceRecord::new(Category::Gpu, 2, "Beta"),
        ];
        assert!(RecordStore::from_records(mixed).is_err());
        assert!(RecordStore::from_records(Vec::new()).unwrap().is_none());
    }
}
