//! 远程查询接口
//!
//! 流程层只依赖这个 trait，不关心具体协议

use crate::error::AppResult;
use crate::models::{Category, MetricKey};
use async_trait::async_trait;

#[async_trait]
pub trait LookupClient: Send + Sync {
    /// 根据 ID 查询设备名称，返回 `(id, name)`
    ///
    /// 名称为空表示该 ID 不存在
    async fn resolve_name(&self, id: u32, category: Category) -> AppResult<(u32, String)>;

    /// 查询设备在指定测试场景下的中位数分数，返回 `(id, score)`
    async fn resolve_median_score(&self, metric: MetricKey, id: u32) -> AppResult<(u32, i64)>;
}
