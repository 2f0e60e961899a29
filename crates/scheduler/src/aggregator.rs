//! 结果汇总
//!
//! 按完成顺序收集终态任务，计算耗时和吞吐量。

use crate::batch::BatchSummary;
use crate::types::{Task, TaskResult, TaskStatus};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::time::Instant;
use uuid::Uuid;

pub struct ResultAggregator {
    batch_id: Uuid,
    total: usize,
    started: Option<Instant>,
    started_at: DateTime<Utc>,
    last_terminal: Option<Instant>,
    completed: usize,
    failed: usize,
    skipped: usize,
    results: Vec<TaskResult>,
    errors: IndexMap<String, String>,
}

impl ResultAggregator {
    pub fn new(batch_id: Uuid, total: usize) -> Self {
        Self {
            batch_id,
            total,
            started: None,
            started_at: Utc::now(),
            last_terminal: None,
            completed: 0,
            failed: 0,
            skipped: 0,
            results: Vec::with_capacity(total),
            errors: IndexMap::new(),
        }
    }

    /// 记录调度开始时刻
    pub fn start(&mut self, at: Instant) {
        self.started = Some(at);
        self.started_at = Utc::now();
    }

    /// 记录一个终态任务
    pub fn record(&mut self, task: &Task, at: Instant) {
        debug_assert!(task.status.is_terminal(), "只能记录终态任务");
        match task.status {
            TaskStatus::Succeeded => {
                self.completed += 1;
                if task.skipped {
                    self.skipped += 1;
                }
            }
            TaskStatus::Failed => {
                self.failed += 1;
                let message = task
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "未知错误".to_string());
                self.errors.insert(task.id.clone(), message);
            }
            TaskStatus::Pending | TaskStatus::Running => return,
        }
        self.last_terminal = Some(match self.last_terminal {
            Some(last) if last > at => last,
            _ => at,
        });
        self.results.push(task.to_result());
    }

    /// 已记录的终态任务数
    pub fn recorded(&self) -> usize {
        self.results.len()
    }

    /// 生成批次汇总
    pub fn finish(&mut self, peak_concurrency: usize) -> BatchSummary {
        let duration_ms = match (self.started, self.last_terminal) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).as_millis() as u64,
            _ => 0,
        };

        BatchSummary {
            batch_id: self.batch_id,
            total_tasks: self.total,
            completed_tasks: self.completed,
            failed_tasks: self.failed,
            skipped_tasks: self.skipped,
            peak_concurrency,
            duration_ms,
            throughput_per_sec: BatchSummary::throughput(self.completed, duration_ms),
            results: std::mem::take(&mut self.results),
            errors: std::mem::take(&mut self.errors),
            started_at: self.started_at,
            completed_at: Utc::now(),
        }
    }
}
