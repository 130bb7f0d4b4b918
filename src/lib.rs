//! # Bench Scraper
//!
//! 从跑分网站批量抓取 CPU / GPU 的名称与中位数分数，合并后生成排序报表
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（并发许可），只暴露能力
//! - `FetchPool` - 有界并发任务池，单个任务失败互不影响
//!
//! ### ② 业务能力层（Clients / Services）
//! - `clients/` - `LookupClient` 远程查询接口及其 HTTP 实现
//! - `services/` - 批次合并、名称解析、报表转换、CSV 写出
//!
//! ### ③ 流程层（Workflow）
//! - `NameResolutionStage` - 遍历 ID 范围解析名称
//! - `ScoreResolutionStage` - 对已存在的设备逐个场景解析分数
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator::App` - 全量更新 / 处理本地数据两种模式
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{LookupClient, MarkClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{FetchPool, Outcome, Progress};
pub use models::{Category, DeviceRecord, IdSpace, MetricKey, RecordStore, UNKNOWN_SCORE};
pub use orchestrator::{Acquisition, App};
pub use services::{BatchMerger, Report, ReportRow, ReportTransformer};
pub use workflow::{NameResolutionStage, ScoreResolutionStage, StageStats};
