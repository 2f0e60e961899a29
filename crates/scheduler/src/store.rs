//! 结果存储接口
//!
//! 读路径用于跳过已有结果，写路径由调用方在批次结束后使用。

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// 结果存储 Trait
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// 查询工作项已有的成功结果
    async fn get_existing_result(&self, item_id: &str) -> Result<Option<serde_json::Value>>;

    /// 保存工作项的成功结果（覆盖旧值）
    async fn save_result(&self, item_id: &str, result: &serde_json::Value) -> Result<()>;
}

/// 内存结果存储
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    results: DashMap<String, serde_json::Value>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.results.contains_key(item_id)
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn get_existing_result(&self, item_id: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.results.get(item_id).map(|r| r.value().clone()))
    }

    async fn save_result(&self, item_id: &str, result: &serde_json::Value) -> Result<()> {
        self.results.insert(item_id.to_string(), result.clone());
        Ok(())
    }
}
