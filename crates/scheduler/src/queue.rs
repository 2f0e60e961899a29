//! 任务队列
//!
//! 按优先级排序的待执行任务队列。出队在锁内完成，同一任务不会被两个工作者取出。

use crate::types::Task;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct TaskQueue {
    pending: Mutex<VecDeque<Task>>,
    running: AtomicUsize,
    peak_running: AtomicUsize,
}

impl TaskQueue {
    /// 创建队列，按优先级稳定排序（同优先级保持提交顺序）
    pub fn new(mut tasks: Vec<Task>) -> Self {
        tasks.sort_by_key(|task| task.priority);
        Self {
            pending: Mutex::new(tasks.into()),
            running: AtomicUsize::new(0),
            peak_running: AtomicUsize::new(0),
        }
    }

    /// 取出最高优先级的任务并标记为运行中
    pub fn dequeue(&self) -> Option<Task> {
        let mut task = self.pending.lock().pop_front()?;
        task.mark_running();
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_running.fetch_max(running, Ordering::SeqCst);
        Some(task)
    }

    /// 运行中的任务到达终态
    pub fn finish(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }

    /// 取出所有尚未调度的任务
    pub fn drain_pending(&self) -> Vec<Task> {
        self.pending.lock().drain(..).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn peak_running(&self) -> usize {
        self.peak_running.load(Ordering::SeqCst)
    }
}
