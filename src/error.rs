use thiserror::Error;

use crate::models::Category;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 远程查询错误
    #[error("查询错误: {0}")]
    Lookup(#[from] LookupError),
    /// 记录存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 任务执行错误
    #[error("任务错误: {0}")]
    Task(#[from] TaskError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 远程查询错误
#[derive(Debug, Error)]
pub enum LookupError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回了非成功状态码
    #[error("返回错误状态 ({endpoint}): {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 响应缺少所需字段
    #[error("响应缺少字段 {field} ({endpoint})")]
    MissingField { endpoint: String, field: String },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 记录存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 更新了不存在的记录
    #[error("记录 {id} 不存在，无法更新分数")]
    UnknownId { id: u32 },
    /// 插入的记录类别与存储不一致
    #[error("类别不一致: 存储为 {expected}, 记录为 {found}")]
    CategoryMismatch { expected: Category, found: Category },
    /// 合并的批次类别不一致
    #[error("无法合并 {first} 与 {second} 数据")]
    MergeConflict { first: Category, second: Category },
    /// 没有可合并的数据
    #[error("没有可处理的数据")]
    EmptyInput,
    /// ID 范围非法
    #[error("ID 范围非法: [{lower}, {upper}]")]
    InvalidRange { lower: u32, upper: u32 },
    /// 持久化记录的 key 与 ID 字段不一致
    #[error("记录 key {key} 与 ID {id} 不一致")]
    KeyMismatch { key: String, id: u32 },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 并发数为 0
    #[error("并发数必须大于 0")]
    ZeroWorkers,
}

/// 任务执行错误
#[derive(Debug, Error)]
pub enum TaskError {
    /// 任务 panic 或被取消
    #[error("任务 #{index} 异常终止: {message}")]
    Aborted { index: usize, message: String },
}

// ========== 从常见错误类型转换 ==========

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_default();
        AppError::Lookup(LookupError::RequestFailed {
            endpoint,
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Lookup(LookupError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Other(format!("正则表达式错误: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建请求失败错误
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Lookup(LookupError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建响应字段缺失错误
    pub fn missing_field(endpoint: impl Into<String>, field: impl Into<String>) -> Self {
        AppError::Lookup(LookupError::MissingField {
            endpoint: endpoint.into(),
            field: field.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建 JSON 文件解析错误
    pub fn json_file_invalid(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::JsonParseFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
