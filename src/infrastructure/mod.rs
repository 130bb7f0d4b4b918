//! 基础设施层
//!
//! 持有稀缺资源（并发许可），只暴露能力

pub mod fetch_pool;

pub use fetch_pool::{default_worker_count, FetchPool, Outcome, OutcomeBatch, Progress};
