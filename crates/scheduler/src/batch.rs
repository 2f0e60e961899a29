//! 批量任务定义
//!
//! 定义批量任务选项、调度器配置、提交请求和批次汇总

use crate::types::{TaskPriority, TaskResult, WorkItem};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 批量任务选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// 最大并发数量 (默认为 10)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// 已有结果时是否跳过 (默认为 true)
    #[serde(default = "default_skip_existing")]
    pub skip_existing: bool,

    /// 默认优先级 (默认为 medium)
    #[serde(default)]
    pub priority: TaskPriority,

    /// 批次截止时间(毫秒)，到期后不再调度新任务
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

fn default_max_concurrency() -> usize {
    10
}

fn default_skip_existing() -> bool {
    true
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            skip_existing: default_skip_existing(),
            priority: TaskPriority::default(),
            deadline_ms: None,
        }
    }
}

/// 调度器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// 单批次最大条目数 (默认为 50)
    #[serde(default = "default_max_batch_items")]
    pub max_batch_items: usize,

    /// 单个任务超时时间(秒) (默认为 120)
    #[serde(default = "default_task_timeout")]
    pub task_timeout_secs: u64,
}

fn default_max_batch_items() -> usize {
    50
}

fn default_task_timeout() -> u64 {
    120
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_batch_items: default_max_batch_items(),
            task_timeout_secs: default_task_timeout(),
        }
    }
}

/// 批量提交请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// 工作项列表（按提交顺序）
    pub items: Vec<WorkItem>,

    /// 批量任务选项
    #[serde(default)]
    pub options: BatchOptions,
}

/// 批次级错误（在创建任何任务前拒绝）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("批次条目过多: {count} 超过上限 {limit}")]
    TooManyItems { count: usize, limit: usize },

    #[error("无效的批次输入: {0}")]
    InvalidInput(String),
}

/// 批次汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// 批次 ID
    pub batch_id: Uuid,

    /// 总任务数
    pub total_tasks: usize,

    /// 成功任务数（含跳过）
    pub completed_tasks: usize,

    /// 失败任务数
    pub failed_tasks: usize,

    /// 命中已有结果而跳过的任务数
    pub skipped_tasks: usize,

    /// 同时运行的任务数峰值
    pub peak_concurrency: usize,

    /// 耗时(毫秒)
    pub duration_ms: u64,

    /// 吞吐量(任务/秒)
    pub throughput_per_sec: f64,

    /// 任务结果（按完成顺序）
    pub results: Vec<TaskResult>,

    /// 失败任务的错误描述（task id -> 错误）
    pub errors: IndexMap<String, String>,

    /// 开始时间
    pub started_at: DateTime<Utc>,

    /// 完成时间
    pub completed_at: DateTime<Utc>,
}

impl BatchSummary {
    /// 计算吞吐量，耗时为 0 时返回 0
    pub fn throughput(completed: usize, duration_ms: u64) -> f64 {
        if duration_ms == 0 {
            0.0
        } else {
            completed as f64 / (duration_ms as f64 / 1000.0)
        }
    }
}
