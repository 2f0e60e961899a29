//! ScoutCast Batch Scheduler
//!
//! 提供批量分析任务调度功能，支持优先级、并发控制、跳过已有结果等。
//!
//! ## 功能
//! - 按优先级排队（同优先级保持提交顺序）
//! - 滑动窗口并发控制
//! - 从凭证池借出凭证并报告使用结果
//! - 已有结果的条目直接跳过
//! - 单个任务失败不影响批次
//! - 结果汇总与吞吐量统计
//! - 结果持久化到 SQLite
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use scoutcast_core::credential::{CredentialPool, PoolConfig};
//! use scoutcast_scheduler::{
//!     BatchOptions, BatchScheduler, MemoryResultStore, SchedulerConfig, TaskExecutor, WorkItem,
//! };
//! use std::sync::Arc;
//!
//! # async fn example(executor: Arc<dyn TaskExecutor>) {
//! let pool = Arc::new(CredentialPool::from_secrets(["token-a", "token-b"], PoolConfig::default()));
//! let scheduler = BatchScheduler::new(
//!     pool,
//!     executor,
//!     Arc::new(MemoryResultStore::new()),
//!     SchedulerConfig::default(),
//! );
//!
//! let items = vec![WorkItem::new("post-1"), WorkItem::new("post-2")];
//! let summary = scheduler.run(items, BatchOptions::default()).await.unwrap();
//! println!("completed {}/{}", summary.completed_tasks, summary.total_tasks);
//! # }
//! ```

pub mod aggregator;
pub mod batch;
pub mod executor;
pub mod queue;
pub mod result_dao;
pub mod scheduler;
pub mod store;
pub mod types;

pub use aggregator::ResultAggregator;
pub use batch::{BatchOptions, BatchRequest, BatchSummary, SchedulerConfig, SchedulerError};
pub use executor::{OperationError, TaskExecutor};
pub use queue::TaskQueue;
pub use result_dao::SqliteResultStore;
pub use scheduler::BatchScheduler;
pub use store::{MemoryResultStore, ResultStore};
pub use types::{Task, TaskError, TaskPriority, TaskResult, TaskStatus, WorkItem};
