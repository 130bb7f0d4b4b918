//! 设备记录模型
//!
//! 定义类别（CPU / GPU）、测试场景以及单个设备的聚合记录

use crate::error::{AppResult, StoreError};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 尚未获取到分数时的占位值
pub const UNKNOWN_SCORE: i64 = -1;

/// 设备类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Cpu,
    Gpu,
}

impl Category {
    /// 列名前缀，例如 `CPU ID`
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Cpu => "CPU",
            Category::Gpu => "GPU",
        }
    }

    /// 该类别适用的两个测试场景，第一个为主要排序指标
    pub fn metrics(self) -> [MetricKey; 2] {
        match self {
            Category::Cpu => [MetricKey::CpuSingleCore, MetricKey::CpuAllCores],
            Category::Gpu => [MetricKey::GpuGraphics, MetricKey::GpuRaytracing],
        }
    }

    /// 主要排序指标
    pub fn primary_metric(self) -> MetricKey {
        self.metrics()[0]
    }

    /// 默认探测的 ID 范围
    pub fn default_id_range(self) -> (u32, u32) {
        match self {
            Category::Cpu => (1, 4000),
            Category::Gpu => (1, 2000),
        }
    }

    pub fn id_column(self) -> String {
        format!("{} ID", self.prefix())
    }

    pub fn name_column(self) -> String {
        format!("{} Name", self.prefix())
    }

    /// 从字符串解析类别（不区分大小写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Some(Category::Cpu),
            "gpu" => Some(Category::Gpu),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// 测试场景
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKey {
    /// CPU Profile 单线程
    CpuSingleCore,
    /// CPU Profile 全线程
    CpuAllCores,
    /// Time Spy 显卡分数
    GpuGraphics,
    /// Port Royal 光追分数
    GpuRaytracing,
}

impl MetricKey {
    /// 表格中的列名
    pub fn label(self) -> &'static str {
        match self {
            MetricKey::CpuSingleCore => "CPU Single Core Score",
            MetricKey::CpuAllCores => "CPU All Cores Score",
            MetricKey::GpuGraphics => "Time Spy Graphics Score",
            MetricKey::GpuRaytracing => "Port Royal Graphics Score",
        }
    }

    /// 远程接口中的测试代码
    pub fn test_code(self) -> &'static str {
        match self {
            MetricKey::CpuSingleCore | MetricKey::CpuAllCores => "CPUP P",
            MetricKey::GpuGraphics => "TS P",
            MetricKey::GpuRaytracing => "PR P",
        }
    }

    /// 远程接口中的分数类型
    pub fn score_type(self) -> &'static str {
        match self {
            MetricKey::CpuSingleCore => "singleThreadScore",
            MetricKey::CpuAllCores => "maxThreadsScore",
            MetricKey::GpuGraphics | MetricKey::GpuRaytracing => "graphicsScore",
        }
    }

    pub fn category(self) -> Category {
        match self {
            MetricKey::CpuSingleCore | MetricKey::CpuAllCores => Category::Cpu,
            MetricKey::GpuGraphics | MetricKey::GpuRaytracing => Category::Gpu,
        }
    }

    /// 在该类别分数数组中的位置
    fn slot(self) -> usize {
        match self {
            MetricKey::CpuSingleCore | MetricKey::GpuGraphics => 0,
            MetricKey::CpuAllCores | MetricKey::GpuRaytracing => 1,
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 单个设备的聚合记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PersistedRecord", into = "PersistedRecord")]
pub struct DeviceRecord {
    pub id: u32,
    pub category: Category,
    pub name: String,
    scores: [i64; 2],
}

impl DeviceRecord {
    /// 创建新记录，所有分数初始化为占位值
    pub fn new(category: Category, id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            category,
            name: name.into(),
            scores: [UNKNOWN_SCORE; 2],
        }
    }

    pub fn with_scores(mut self, scores: [i64; 2]) -> Self {
        self.scores = scores;
        self
    }

    /// 读取分数，场景不属于本类别时返回 None
    pub fn score(&self, metric: MetricKey) -> Option<i64> {
        (metric.category() == self.category).then(|| self.scores[metric.slot()])
    }

    pub fn primary_score(&self) -> i64 {
        self.scores[0]
    }

    pub fn scores(&self) -> [i64; 2] {
        self.scores
    }

    /// 写入分数
    pub fn set_score(&mut self, metric: MetricKey, score: i64) -> AppResult<()> {
        if metric.category() != self.category {
            return Err(StoreError::CategoryMismatch {
                expected: self.category,
                found: metric.category(),
            }
            .into());
        }
        self.scores[metric.slot()] = score;
        Ok(())
    }
}

// ========== 持久化格式 ==========
//
// 字段名本身携带类别信息，解析时严格匹配其中一种形状

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CpuShape {
    #[serde(rename = "CPU ID", deserialize_with = "whole_id")]
    id: u32,
    #[serde(rename = "CPU Name")]
    name: String,
    #[serde(
        rename = "CPU Single Core Score",
        default = "unknown_score",
        deserialize_with = "whole_score"
    )]
    single_core: i64,
    #[serde(
        rename = "CPU All Cores Score",
        default = "unknown_score",
        deserialize_with = "whole_score"
    )]
    all_cores: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct GpuShape {
    #[serde(rename = "GPU ID", deserialize_with = "whole_id")]
    id: u32,
    #[serde(rename = "GPU Name")]
    name: String,
    #[serde(
        rename = "Time Spy Graphics Score",
        default = "unknown_score",
        deserialize_with = "whole_score"
    )]
    graphics: i64,
    #[serde(
        rename = "Port Royal Graphics Score",
        default = "unknown_score",
        deserialize_with = "whole_score"
    )]
    raytracing: i64,
}

fn unknown_score() -> i64 {
    UNKNOWN_SCORE
}

// 旧文件里的数字可能是浮点形式（如 `100.0`），统一取整

fn whole_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(D::Error::custom(format!("无效的分数: {}", value)));
    }
    Ok(value.round() as i64)
}

fn whole_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?.round();
    if !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(D::Error::custom(format!("无效的 ID: {}", value)));
    }
    Ok(value as u32)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PersistedRecord {
    Cpu(CpuShape),
    Gpu(GpuShape),
}

impl From<DeviceRecord> for PersistedRecord {
    fn from(record: DeviceRecord) -> Self {
        let [first, second] = record.scores;
        match record.category {
            Category::Cpu => PersistedRecord::Cpu(CpuShape {
                id: record.id,
                name: record.name,
                single_core: first,
                all_cores: second,
            }),
            Category::Gpu => PersistedRecord::Gpu(GpuShape {
                id: record.id,
                name: record.name,
                graphics: first,
                raytracing: second,
            }),
        }
    }
}

impl From<PersistedRecord> for DeviceRecord {
    fn from(value: PersistedRecord) -> Self {
        match value {
            PersistedRecord::Cpu(shape) => DeviceRecord::new(Category::Cpu, shape.id, shape.name)
                .with_scores([shape.single_core, shape.all_cores]),
            PersistedRecord::Gpu(shape) => DeviceRecord::new(Category::Gpu, shape.id, shape.name)
                .with_scores([shape.graphics, shape.raytracing]),
        }
    }
}
