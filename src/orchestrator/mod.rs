//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源管理和阶段调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (持有 FetchPool，按模式调度)
//!     ↓
//! workflow (名称阶段 / 分数阶段)
//!     ↓
//! clients (LookupClient) + models (RecordStore)
//!     ↓
//! infrastructure (FetchPool)
//!
//! orchestrator::App
//!     ↓
//! services (合并 / 名称解析 / 报表转换 / 写出)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有 FetchPool
//! 2. **单点写入**：RecordStore 只由消费结果的一方修改
//! 3. **无业务逻辑**：只做调度和统计，不做具体清洗判断

pub mod pipeline;

pub use pipeline::{Acquisition, App};
