//! 抓取与报表流水线 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源管理与阶段调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建抓取池、查询客户端、报表转换器
//! 2. **全量更新**：名称阶段 → 分数阶段（逐个场景）→ 保存 JSON → 导出报表
//! 3. **处理本地数据**：加载多个 JSON → 合并 → 导出报表
//! 4. **全局统计**：汇总各阶段结果与耗时
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 FetchPool 的模块，按引用传给各阶段
//! - **阶段串行**：每个阶段取完全部结果后才开始下一个
//! - **向下委托**：具体查询交给 workflow，清洗排序交给 services

use crate::clients::{LookupClient, MarkClient};
use crate::config::Config;
use crate::infrastructure::FetchPool;
use crate::models::{self, Category, IdSpace, RecordStore};
use crate::services::{log_report_preview, BatchMerger, Report, ReportTransformer, ReportWriter};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::{NameResolutionStage, ScoreResolutionStage, StageStats};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// 报表预览行数
const PREVIEW_ROWS: usize = 10;

/// 应用主结构
pub struct App {
    config: Config,
    pool: FetchPool,
    client: Arc<dyn LookupClient>,
    transformer: ReportTransformer,
}

/// 一次抓取的结果
#[derive(Debug)]
pub struct Acquisition {
    pub store: RecordStore,
    pub stages: Vec<StageStats>,
}

impl App {
    /// 使用默认的 HTTP 客户端初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        let client = MarkClient::new(&config).context("无法创建查询客户端")?;
        Self::with_client(config, Arc::new(client))
    }

    /// 使用指定的查询客户端初始化应用
    pub fn with_client(config: Config, client: Arc<dyn LookupClient>) -> Result<Self> {
        let pool = FetchPool::new(config.max_workers).context("无法创建抓取池")?;
        let transformer = ReportTransformer::new(config.score_floor)?;

        Ok(Self {
            config,
            pool,
            client,
            transformer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &FetchPool {
        &self.pool
    }

    /// 根据配置与命令行覆盖值构造 ID 范围
    pub fn id_space(
        &self,
        category: Category,
        lower: Option<u32>,
        upper: Option<u32>,
    ) -> Result<IdSpace> {
        let (default_lower, default_upper) = self.config.id_range(category);
        let space = IdSpace::new(
            category,
            lower.unwrap_or(default_lower),
            upper.unwrap_or(default_upper),
        )?;
        Ok(space)
    }

    /// 抓取一个 ID 范围内的全部设备及分数
    pub async fn acquire(&self, space: &IdSpace) -> Acquisition {
        let (mut store, name_stats) = NameResolutionStage::new(self.client.clone())
            .run(&self.pool, space)
            .await;

        let mut stages = vec![name_stats];
        if store.is_empty() {
            warn!("⚠️ 没有找到任何 {} 设备，跳过分数查询", space.category());
        } else {
            let score_stats = ScoreResolutionStage::new(self.client.clone())
                .run(&self.pool, &mut store)
                .await;
            stages.extend(score_stats);
        }

        Acquisition { store, stages }
    }

    /// 全量更新：抓取 → 保存 JSON → 导出报表
    pub async fn run_full_update(&self, space: &IdSpace) -> Result<Report> {
        log_startup(&self.config, "全量更新");
        let start = Instant::now();

        let acquisition = self.acquire(space).await;
        info!("\nTotal time: {:.2}s", start.elapsed().as_secs_f64());

        let json_path = self.output_path(space.category(), "json");
        models::save_store_to_json(&acquisition.store, &json_path)
            .await
            .with_context(|| format!("无法保存原始数据: {}", json_path.display()))?;

        let report = self.export(&acquisition.store)?;
        print_final_stats(acquisition.store.len(), report.len(), start.elapsed());
        Ok(report)
    }

    /// 处理本地数据：加载多个 JSON → 合并 → 导出报表
    pub async fn run_process_local(&self, files: &[PathBuf]) -> Result<Report> {
        log_startup(&self.config, "处理本地数据");
        let start = Instant::now();

        if files.is_empty() {
            anyhow::bail!("没有选择任何 JSON 文件");
        }

        let stores = models::load_all_json_files(files)
            .await
            .context("加载本地数据失败")?;

        let mut merger = BatchMerger::new();
        for store in stores {
            merger.push(store).context("合并本地数据失败")?;
        }
        let merged = merger.finish().context("本地文件中没有可处理的数据")?;

        let report = self.export(&merged)?;
        print_final_stats(merged.len(), report.len(), start.elapsed());
        Ok(report)
    }

    /// 转换并写出报表
    pub fn export(&self, store: &RecordStore) -> Result<Report> {
        let report = self.transformer.transform(store);

        // 报表为空时也写出只有表头的文件
        let csv_path = self.output_path(store.category(), "csv");
        ReportWriter::with_path(&csv_path)
            .write(&report)
            .with_context(|| format!("无法写出报表: {}", csv_path.display()))?;

        if report.is_empty() {
            warn!("⚠️ 报表为空，没有记录通过筛选");
        } else {
            log_report_preview(&report, PREVIEW_ROWS);
        }
        Ok(report)
    }

    /// 输出文件路径，例如 `CPU_Result.json`
    pub fn output_path(&self, category: Category, extension: &str) -> PathBuf {
        Path::new(&self.config.output_dir).join(format!("{}_Result.{}", category, extension))
    }
}
