/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use crate::config::Config;
use crate::infrastructure::Progress;
use crate::workflow::StageStats;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, mode: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", mode);
    info!("📊 最大并发数: {}", config.max_workers);
    info!("🌐 接口地址: {}", config.api_base_url);
    info!("{}", "=".repeat(60));
}

/// 记录阶段开始信息
///
/// # 参数
/// - `stage`: 阶段名称
/// - `total`: 本阶段任务数
pub fn log_stage_start(stage: &str, total: usize) {
    info!("{}", "-".repeat(60));
    info!("📦 {} - 共 {} 个任务", stage, total);
}

/// 每完成约 10% 输出一次进度
///
/// # 参数
/// - `stage`: 阶段名称
/// - `done`: 本阶段已完成数量
/// - `total`: 本阶段任务数
/// - `overall`: 抓取池累计进度
pub fn log_progress(stage: &str, done: usize, total: usize, overall: Progress) {
    let step = (total / 10).max(1);
    if done % step == 0 || done == total {
        info!(
            "⏳ {} {}/{} ({:.0}%) | 累计 {}",
            stage,
            done,
            total,
            done as f64 * 100.0 / total.max(1) as f64,
            overall
        );
    }
}

/// 记录阶段完成信息
pub fn log_stage_complete(stats: &StageStats) {
    info!("✓ {}", stats);
}

/// 打印最终统计信息
///
/// # 参数
/// - `records`: 最终记录数
/// - `report_rows`: 报表行数
/// - `elapsed`: 总耗时
pub fn print_final_stats(records: usize, report_rows: usize, elapsed: Duration) {
    info!("{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 记录数: {}", records);
    info!("📋 报表行数: {}", report_rows);
    info!("⏱️ 总耗时: {:.2}s", elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("GeForce RTX 4090", 7), "GeForce...");
        assert_eq!(truncate_text("Arc", 7), "Arc");
    }
}
