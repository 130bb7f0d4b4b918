//! 流程层（Workflow）
//!
//! 定义两个抓取阶段：先解析名称，再针对已存在的设备解析分数。
//! 阶段之间严格串行，前一阶段的全部结果取完后才开始下一阶段。

pub mod name_stage;
pub mod score_stage;
pub mod stage_stats;

pub use name_stage::NameResolutionStage;
pub use score_stage::ScoreResolutionStage;
pub use stage_stats::StageStats;
