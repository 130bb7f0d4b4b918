use crate::error::{AppError, AppResult, StoreError};
use crate::models::{DeviceRecord, RecordStore};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

/// 从 JSON 文件加载记录存储
///
/// 文件为一个对象，key 为字符串形式的 ID，value 为单个设备记录。
/// 空对象返回 `Ok(None)`。
pub async fn load_json_to_store(json_file_path: &Path) -> AppResult<Option<RecordStore>> {
    let path_str = json_file_path.display().to_string();
    let content = fs::read_to_string(json_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    parse_store_from(&content, &path_str)
}

/// 从 JSON 文本解析记录存储
pub fn parse_store(content: &str) -> AppResult<Option<RecordStore>> {
    parse_store_from(content, "<inline>")
}

fn parse_store_from(content: &str, source: &str) -> AppResult<Option<RecordStore>> {
    let raw: BTreeMap<String, DeviceRecord> =
        serde_json::from_str(content).map_err(|e| AppError::json_file_invalid(source, e))?;

    for (key, record) in &raw {
        if key.trim().parse::<u32>().ok() != Some(record.id) {
            return Err(StoreError::KeyMismatch {
                key: key.clone(),
                id: record.id,
            }
            .into());
        }
    }

    RecordStore::from_records(raw.into_values())
}

/// 将记录存储序列化为 JSON 文本
pub fn store_to_json(store: &RecordStore) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(store.as_map())?)
}

/// 将记录存储保存到 JSON 文件
pub async fn save_store_to_json(store: &RecordStore, json_file_path: &Path) -> AppResult<()> {
    let content = store_to_json(store)?;
    if let Some(parent) = json_file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }
    }
    fs::write(json_file_path, content)
        .await
        .map_err(|e| AppError::file_write_failed(json_file_path.display().to_string(), e))?;

    tracing::info!("原始数据已保存至: {}", json_file_path.display());
    Ok(())
}

/// 依次加载多个 JSON 文件，按加载顺序返回
///
/// 空文件会被跳过并记录警告；任何文件读取或解析失败都会中止。
pub async fn load_all_json_files(paths: &[impl AsRef<Path>]) -> AppResult<Vec<RecordStore>> {
    let mut stores = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_json_to_store(path).await? {
            Some(store) => {
                tracing::info!("成功加载 {} 条 {} 记录", store.len(), store.category());
                stores.push(store);
            }
            None => {
                tracing::warn!("文件中没有记录，已跳过: {}", path.display());
            }
        }
    }

    Ok(stores)
}
