//! 任务数据模型
//!
//! 定义单个分析任务的优先级、状态、错误和结果

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 任务优先级
///
/// 排序上 High < Medium < Low，按升序排序即为调度顺序。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// 等待调度
    #[default]
    Pending,
    /// 正在执行
    Running,
    /// 执行成功（含命中已有结果而跳过）
    Succeeded,
    /// 执行失败
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// 单个任务的错误（作为数据记录，不会中断批次）
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskError {
    /// 凭证池中没有健康凭证
    #[error("没有可用凭证")]
    NoCredentialAvailable,

    /// 抓取或分析失败
    #[error("外部操作失败: {reason}")]
    ExternalOperationFailed { reason: String },

    /// 批次截止时间已到，任务未被调度
    #[error("批量任务已超过截止时间，任务未执行")]
    DeadlineExceeded,
}

/// 工作项 - 调用方提交的单个条目
///
/// 既可以是纯字符串 ID，也可以是带覆盖选项的对象。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WorkItemRepr")]
pub struct WorkItem {
    /// 目标资源 ID
    pub id: String,
    /// 覆盖批次默认优先级
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// 覆盖批次默认的跳过已有结果策略
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_if_result_exists: Option<bool>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WorkItemRepr {
    Id(String),
    Full {
        id: String,
        #[serde(default)]
        priority: Option<TaskPriority>,
        #[serde(default)]
        skip_if_result_exists: Option<bool>,
    },
}

impl From<WorkItemRepr> for WorkItem {
    fn from(repr: WorkItemRepr) -> Self {
        match repr {
            WorkItemRepr::Id(id) => Self::new(id),
            WorkItemRepr::Full {
                id,
                priority,
                skip_if_result_exists,
            } => Self {
                id,
                priority,
                skip_if_result_exists,
            },
        }
    }
}

impl WorkItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: None,
            skip_if_result_exists: None,
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_skip_if_result_exists(mut self, skip: bool) -> Self {
        self.skip_if_result_exists = Some(skip);
        self
    }
}

impl From<String> for WorkItem {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&str> for WorkItem {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// 任务 - 批次内单个工作项的执行记录
#[derive(Debug, Clone)]
pub struct Task {
    /// 工作项 ID
    pub id: String,
    /// 优先级
    pub priority: TaskPriority,
    /// 已有结果时是否跳过
    pub skip_if_result_exists: bool,
    /// 提交顺序
    pub submitted_index: usize,
    /// 任务状态
    pub status: TaskStatus,
    /// 执行结果（成功时）
    pub result: Option<serde_json::Value>,
    /// 错误（失败时）
    pub error: Option<TaskError>,
    /// 是否因已有结果而跳过
    pub skipped: bool,
    /// 使用的凭证 ID
    pub credential_id: Option<String>,
    /// 开始执行时间
    pub started_at: Option<DateTime<Utc>>,
    /// 完成时间
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        id: String,
        priority: TaskPriority,
        skip_if_result_exists: bool,
        submitted_index: usize,
    ) -> Self {
        Self {
            id,
            priority,
            skip_if_result_exists,
            submitted_index,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            skipped: false,
            credential_id: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// 标记为运行中
    pub fn mark_running(&mut self) {
        self.status = TaskStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// 标记为成功
    pub fn mark_succeeded(&mut self, result: serde_json::Value) {
        self.status = TaskStatus::Succeeded;
        self.result = Some(result);
        self.error = None;
        self.completed_at = Some(Utc::now());
    }

    /// 命中已有结果，直接标记为成功
    pub fn mark_skipped(&mut self, existing: serde_json::Value) {
        self.skipped = true;
        self.mark_succeeded(existing);
    }

    /// 标记为失败
    pub fn mark_failed(&mut self, error: TaskError) {
        self.status = TaskStatus::Failed;
        self.error = Some(error);
        self.result = None;
        self.completed_at = Some(Utc::now());
    }

    /// 生成结果记录
    pub fn to_result(&self) -> TaskResult {
        TaskResult {
            task_id: self.id.clone(),
            status: self.status,
            result: self.result.clone(),
            error: self.error.clone(),
            skipped: self.skipped,
            credential_id: self.credential_id.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

/// 单个任务结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// 任务 ID
    pub task_id: String,

    /// 任务状态
    pub status: TaskStatus,

    /// 结果内容 (如果成功)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// 错误 (如果失败)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,

    /// 是否命中已有结果
    #[serde(default)]
    pub skipped: bool,

    /// 使用的凭证 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,

    /// 开始时间
    pub started_at: Option<DateTime<Utc>>,

    /// 完成时间
    pub completed_at: Option<DateTime<Utc>>,
}
