use std::fmt::Display;

/// 单个阶段的统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageStats {
    /// 阶段名称（仅用于日志显示）
    pub stage: String,
    /// 提交的任务数
    pub submitted: usize,
    /// 成功写入存储的数量
    pub resolved: usize,
    /// 确认不存在的数量
    pub not_found: usize,
    /// 查询失败的数量
    pub failed: usize,
}

impl StageStats {
    pub fn new(stage: impl Into<String>, submitted: usize) -> Self {
        Self {
            stage: stage.into(),
            submitted,
            ..Default::default()
        }
    }

    /// 已处理的任务数
    pub fn processed(&self) -> usize {
        self.resolved + self.not_found + self.failed
    }
}

impl Display for StageStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] 成功 {} / 不存在 {} / 失败 {} / 共 {}",
            self.stage, self.resolved, self.not_found, self.failed, self.submitted
        )
    }
}
