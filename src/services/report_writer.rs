//! 报表写入服务 - 业务能力层
//!
//! 只负责"把报表写成 CSV"能力，不关心流程

use crate::error::{AppError, AppResult};
use crate::services::Report;
use std::path::{Path, PathBuf};
use tracing::info;

/// 报表写入服务
pub struct ReportWriter {
    report_file_path: PathBuf,
}

impl ReportWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            report_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.report_file_path
    }

    /// 写入报表
    pub fn write(&self, report: &Report) -> AppResult<()> {
        let path_str = self.report_file_path.display().to_string();
        if let Some(parent) = self.report_file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::file_write_failed(&path_str, e))?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.report_file_path)
            .map_err(|e| AppError::file_write_failed(&path_str, e))?;
        write_rows(&mut writer, report)?;
        writer
            .flush()
            .map_err(|e| AppError::file_write_failed(&path_str, e))?;

        info!("结果已保存至: {}", path_str);
        Ok(())
    }
}

/// 把报表渲染为 CSV 文本
pub fn report_to_csv(report: &Report) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_rows(&mut writer, report)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Other(format!("CSV 输出失败: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Other(format!("CSV 编码错误: {}", e)))
}

fn write_rows<W: std::io::Write>(writer: &mut csv::Writer<W>, report: &Report) -> AppResult<()> {
    writer.write_record(report.columns())?;
    for row in &report.rows {
        writer.write_record([
            row.id.to_string(),
            row.vendor.clone(),
            row.model.clone(),
            row.name.clone(),
            row.scores[0].to_string(),
            row.scores[1].to_string(),
        ])?;
    }
    Ok(())
}

/// 在日志中打印报表前几行
pub fn log_report_preview(report: &Report, limit: usize) {
    info!("{}", report.columns().join(" | "));
    for row in report.rows.iter().take(limit) {
        info!(
            "{:>4} | {} | {} | {} | {} | {} | {}",
            row.index, row.id, row.vendor, row.model, row.name, row.scores[0], row.scores[1]
        );
    }
    if report.len() > limit {
        info!("... 共 {} 行", report.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::services::ReportRow;

    fn sample_report() -> Report {
        Report {
            category: Category::Cpu,
            rows: vec![ReportRow {
                index: 0,
                id: 1,
                vendor: "AMD".to_string(),
                model: "Ryzen 9 7950X".to_string(),
                name: "AMD Ryzen 9 7950X 16-Core Processor".to_string(),
                scores: [1200, 16000],
            }],
        }
    }

    #[test]
    fn test_report_to_csv() {
        let csv = report_to_csv(&sample_report()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("CPU ID,Vendor,Model,CPU Name,CPU Single Core Score,CPU All Cores Score")
        );
        assert_eq!(
            lines.next(),
            Some("1,AMD,Ryzen 9 7950X,AMD Ryzen 9 7950X 16-Core Processor,1200,16000")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_file() {
        let path = std::env::temp_dir()
            .join(format!("bench_scraper_csv_{}", std::process::id()))
            .join("CPU_Result.csv");
        let writer = ReportWriter::with_path(&path);
        writer.write(&sample_report()).unwrap();

        let content = std::fs::read_to_string(writer.path()).unwrap();
        assert!(content.starts_with("CPU ID,Vendor,Model"));

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
