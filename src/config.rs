use crate::error::{AppError, AppResult, FileError};
use crate::infrastructure::default_worker_count;
use crate::models::Category;
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时进行的查询数量
    pub max_workers: usize,
    /// 远程接口地址
    pub api_base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 输出目录（JSON / CSV）
    pub output_dir: String,
    /// 主要分数低于该值的记录不进入报表
    pub score_floor: i64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 探测的最小 ID
    pub min_id: u32,
    /// CPU 探测的最大 ID
    pub cpu_max_id: u32,
    /// GPU 探测的最大 ID
    pub gpu_max_id: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: default_worker_count(),
            api_base_url: "https://www.3dmark.com".to_string(),
            request_timeout_secs: 30,
            output_dir: ".".to_string(),
            score_floor: 0,
            verbose_logging: false,
            min_id: Category::Cpu.default_id_range().0,
            cpu_max_id: Category::Cpu.default_id_range().1,
            gpu_max_id: Category::Gpu.default_id_range().1,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 读取 TOML 配置文件（不存在则使用默认值），再应用环境变量
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::from_env());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        Self {
            max_workers: std::env::var("MAX_WORKERS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_workers),
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(self.api_base_url),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            score_floor: std::env::var("SCORE_FLOOR").ok().and_then(|v| v.parse().ok()).unwrap_or(self.score_floor),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            min_id: std::env::var("MIN_ID").ok().and_then(|v| v.parse().ok()).unwrap_or(self.min_id),
            cpu_max_id: std::env::var("CPU_MAX_ID").ok().and_then(|v| v.parse().ok()).unwrap_or(self.cpu_max_id),
            gpu_max_id: std::env::var("GPU_MAX_ID").ok().and_then(|v| v.parse().ok()).unwrap_or(self.gpu_max_id),
        }
    }

    /// 指定类别的默认 ID 范围
    pub fn id_range(&self, category: Category) -> (u32, u32) {
        match category {
            Category::Cpu => (self.min_id, self.cpu_max_id),
            Category::Gpu => (self.min_id, self.gpu_max_id),
        }
    }
}
