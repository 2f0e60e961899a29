//! 任务执行器
//!
//! 单个工作项的抓取 + 分析由外部实现，调度器只依赖这里的接口。

use async_trait::async_trait;
use scoutcast_core::credential::LeasedCredential;
use thiserror::Error;

/// 外部操作错误
///
/// 无论哪种错误，对凭证池都统一报告为一次失败。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("网络错误: {0}")]
    Network(String),

    #[error("请求被限流: {0}")]
    RateLimited(String),

    #[error("内容错误: {0}")]
    Content(String),

    #[error("任务超时 ({0}s)")]
    Timeout(u64),
}

/// 任务执行器 Trait
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// 使用借出的凭证处理一个工作项
    ///
    /// # 返回
    /// - 成功返回分析结果（JSON 格式）
    /// - 失败返回 `OperationError`
    async fn execute(
        &self,
        credential: &LeasedCredential,
        item_id: &str,
    ) -> Result<serde_json::Value, OperationError>;
}
