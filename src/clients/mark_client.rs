//! 跑分网站 API 客户端
//!
//! 封装名称查询与中位数分数查询两个 HTTP 接口

use crate::clients::LookupClient;
use crate::config::Config;
use crate::error::{AppError, AppResult, LookupError};
use crate::models::{Category, MetricKey};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// 跑分网站客户端
#[derive(Clone)]
pub struct MarkClient {
    http: reqwest::Client,
    base_url: String,
}

impl MarkClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::request_failed(&config.api_base_url, e))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn name_endpoint(&self, category: Category) -> String {
        format!(
            "{}/proxycon/ajax/search/{}name",
            self.base_url,
            category.prefix().to_ascii_lowercase()
        )
    }

    fn median_endpoint(&self) -> String {
        format!("{}/proxycon/ajax/medianscore", self.base_url)
    }

    /// 发送 GET 请求并解析 JSON
    async fn get_json(&self, endpoint: &str, query: &[(&str, String)]) -> AppResult<Value> {
        let response = self
            .http
            .get(endpoint)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::request_failed(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::BadStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body: Value = response.json().await?;
        Ok(body)
    }
}

#[async_trait]
impl LookupClient for MarkClient {
    async fn resolve_name(&self, id: u32, category: Category) -> AppResult<(u32, String)> {
        let endpoint = self.name_endpoint(category);
        let body = self.get_json(&endpoint, &[("id", id.to_string())]).await?;
        let name = extract_name(&body, id);

        debug!("{} #{} -> {:?}", category, id, name);
        Ok((id, name))
    }

    async fn resolve_median_score(&self, metric: MetricKey, id: u32) -> AppResult<(u32, i64)> {
        let endpoint = self.median_endpoint();
        let (cpu_id, gpu_id) = match metric.category() {
            Category::Cpu => (id.to_string(), String::new()),
            Category::Gpu => (String::new(), id.to_string()),
        };
        let gpu_count = match metric.category() {
            Category::Cpu => "0",
            Category::Gpu => "1",
        };

        let query = [
            ("test", metric.test_code().to_string()),
            ("cpuId", cpu_id),
            ("gpuId", gpu_id),
            ("gpuCount", gpu_count.to_string()),
            ("deviceType", "ALL".to_string()),
            ("storageModel", "ALL".to_string()),
            ("memoryChannels", "0".to_string()),
            ("country", String::new()),
            ("scoreType", metric.score_type().to_string()),
            ("hofMode", "false".to_string()),
            ("showInvalidResults", "false".to_string()),
        ];

        let body = self.get_json(&endpoint, &query).await?;
        let score = extract_median(&body).ok_or_else(|| AppError::missing_field(&endpoint, "median"))?;

        debug!("{} #{} [{}] -> {}", metric.category(), id, metric, score);
        Ok((id, score))
    }
}

// ========== 响应解析 ==========

/// 从名称查询结果中提取名称
///
/// 结果为 `[{ "id": .., "label": .. }]`，只取 id 相同的项；
/// 各项都不带 id 时才取第一项。没有匹配、空数组或缺少 label 时返回空字符串
fn extract_name(body: &Value, id: u32) -> String {
    let Some(items) = body.as_array() else {
        return String::new();
    };

    let item_id = |item: &Value| {
        item.get("id")
            .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
    };

    let chosen = if items.iter().any(|item| item.get("id").is_some()) {
        items.iter().find(|item| item_id(*item) == Some(u64::from(id)))
    } else {
        items.first()
    };

    chosen
        .and_then(|item| item.get("label"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// 从分数查询结果中提取中位数，非法值返回 None
fn extract_median(body: &Value) -> Option<i64> {
    let median = body.get("median")?.as_f64()?;
    if median.is_finite() && median >= 0.0 {
        Some(median.round() as i64)
    } else {
        None
    }
}
