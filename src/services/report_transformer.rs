//! 报表转换服务 - 业务能力层
//!
//! 对合并后的记录做清洗、补充厂商/型号、排序，得到最终报表。
//! 纯函数：不修改输入，同一输入多次调用结果相同。

use crate::error::AppResult;
use crate::models::{Category, RecordStore};
use crate::services::NameParser;
use tracing::debug;

/// 报表中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// 从 0 开始的连续行号
    pub index: usize,
    pub id: u32,
    pub vendor: String,
    pub model: String,
    pub name: String,
    pub scores: [i64; 2],
}

impl ReportRow {
    pub fn primary_score(&self) -> i64 {
        self.scores[0]
    }
}

/// 最终报表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub category: Category,
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// 列名，厂商与型号位于名称列之前
    pub fn columns(&self) -> Vec<String> {
        let [first, second] = self.category.metrics();
        vec![
            self.category.id_column(),
            "Vendor".to_string(),
            "Model".to_string(),
            self.category.name_column(),
            first.label().to_string(),
            second.label().to_string(),
        ]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 报表转换服务
pub struct ReportTransformer {
    cpu_parser: NameParser,
    gpu_parser: NameParser,
    score_floor: i64,
}

impl ReportTransformer {
    /// # 参数
    /// - `score_floor`: 主要分数低于该值的记录被剔除
    pub fn new(score_floor: i64) -> AppResult<Self> {
        Ok(Self {
            cpu_parser: NameParser::new(Category::Cpu)?,
            gpu_parser: NameParser::new(Category::Gpu)?,
            score_floor,
        })
    }

    pub fn score_floor(&self) -> i64 {
        self.score_floor
    }

    /// 生成报表
    pub fn transform(&self, store: &RecordStore) -> Report {
        let parser = match store.category() {
            Category::Cpu => &self.cpu_parser,
            Category::Gpu => &self.gpu_parser,
        };

        let mut rows: Vec<ReportRow> = store
            .records()
            // 剔除名字为空
            .filter(|record| !record.name.trim().is_empty())
            // 剔除分数过低数据
            .filter(|record| record.primary_score() >= self.score_floor)
            .map(|record| {
                let (vendor, model) = match parser.parse(&record.name) {
                    Some(parsed) => (parsed.vendor, parsed.model),
                    None => {
                        debug!("无法解析名称: {}", record.name);
                        (String::new(), String::new())
                    }
                };
                ReportRow {
                    index: 0,
                    id: record.id,
                    vendor,
                    model,
                    name: record.name.clone(),
                    scores: record.scores(),
                }
            })
            .collect();

        // 稳定排序，同分保持原有顺序
        rows.sort_by(|a, b| b.primary_score().cmp(&a.primary_score()));
        for (index, row) in rows.iter_mut().enumerate() {
            row.index = index;
        }

        Report {
            category: store.category(),
            rows,
        }
    }
}
