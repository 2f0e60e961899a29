//! 批量调度器
//!
//! 把一批工作项按优先级排队，以滑动窗口方式并发执行：
//! 调度循环先占用并发槽位、再从凭证池借出凭证，然后才按优先级出队任务；
//! 工作者调用外部执行器，最后把结果报告回凭证池。
//! 单个任务失败只记录为数据，不会中断批次。

use crate::aggregator::ResultAggregator;
use crate::batch::{BatchOptions, BatchSummary, SchedulerConfig, SchedulerError};
use crate::executor::{OperationError, TaskExecutor};
use crate::queue::TaskQueue;
use crate::store::ResultStore;
use crate::types::{Task, TaskError, WorkItem};
use futures::FutureExt;
use parking_lot::Mutex;
use scoutcast_core::credential::{CredentialLease, CredentialPool};
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

/// 批量调度器
pub struct BatchScheduler {
    pool: Arc<CredentialPool>,
    executor: Arc<dyn TaskExecutor>,
    results: Arc<dyn ResultStore>,
    config: SchedulerConfig,
}

/// 单个批次内工作者共享的上下文
#[derive(Clone)]
struct Worker {
    batch_id: Uuid,
    executor: Arc<dyn TaskExecutor>,
    queue: Arc<TaskQueue>,
    aggregator: Arc<Mutex<ResultAggregator>>,
    task_timeout_secs: u64,
}

impl BatchScheduler {
    pub fn new(
        pool: Arc<CredentialPool>,
        executor: Arc<dyn TaskExecutor>,
        results: Arc<dyn ResultStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            pool,
            executor,
            results,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<CredentialPool> {
        &self.pool
    }

    /// 执行一个批次，所有任务到达终态后返回汇总
    ///
    /// # 错误
    /// - 条目数超过上限时返回 `SchedulerError::TooManyItems`
    /// - 存在空 ID 或重复 ID 时返回 `SchedulerError::InvalidInput`
    pub async fn run(
        &self,
        items: Vec<WorkItem>,
        options: BatchOptions,
    ) -> Result<BatchSummary, SchedulerError> {
        self.check_items(&items)?;

        let batch_id = Uuid::new_v4();
        let concurrency = options.max_concurrency.max(1);
        tracing::info!(
            "[BATCH] 开始执行批量任务: id={}, task_count={}, concurrency={}",
            batch_id,
            items.len(),
            concurrency
        );

        let mut aggregator = ResultAggregator::new(batch_id, items.len());
        aggregator.start(Instant::now());

        // 1. 建立任务，已有结果的直接标记成功
        let mut pending = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let mut task = Task::new(
                item.id,
                item.priority.unwrap_or(options.priority),
                item.skip_if_result_exists.unwrap_or(options.skip_existing),
                index,
            );
            if task.skip_if_result_exists {
                match self.results.get_existing_result(&task.id).await {
                    Ok(Some(existing)) => {
                        tracing::debug!("[BATCH] 已有结果，跳过: {}", task.id);
                        task.mark_skipped(existing);
                        aggregator.record(&task, Instant::now());
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("[BATCH] 查询已有结果失败，照常执行: {} - {}", task.id, e);
                    }
                }
            }
            pending.push(task);
        }

        // 2. 按优先级排队
        let worker = Worker {
            batch_id,
            executor: self.executor.clone(),
            queue: Arc::new(TaskQueue::new(pending)),
            aggregator: Arc::new(Mutex::new(aggregator)),
            task_timeout_secs: self.config.task_timeout_secs,
        };

        // 3. 截止时间到期后停止调度新任务
        let deadline = options
            .deadline_ms
            .map(|ms| tokio::time::Instant::now() + Duration::from_millis(ms));
        let deadline_reached = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline_reached);

        // 4. 用 Semaphore 控制并发，空出槽位并借到凭证后才出队下一个任务
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut handles = JoinSet::new();
        while !worker.queue.is_empty() {
            if deadline.is_some_and(|at| tokio::time::Instant::now() >= at) {
                worker.log_deadline();
                break;
            }

            let permit = tokio::select! {
                biased;
                _ = &mut deadline_reached => {
                    worker.log_deadline();
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let lease = tokio::select! {
                biased;
                _ = &mut deadline_reached => {
                    worker.log_deadline();
                    break;
                }
                lease = self.pool.lease_wait() => lease,
            };

            let Some(mut task) = worker.queue.dequeue() else {
                break;
            };
            match lease {
                Ok(lease) => {
                    let worker = worker.clone();
                    handles.spawn(async move {
                        let _permit = permit;
                        worker.run_task(task, lease).await;
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "[BATCH] 无可用凭证: batch_id={}, task_id={}, error={}",
                        batch_id,
                        task.id,
                        e
                    );
                    task.mark_failed(TaskError::NoCredentialAvailable);
                    worker.complete(task);
                }
            }
        }

        // 等待所有已调度任务完成
        while let Some(joined) = handles.join_next().await {
            if let Err(e) = joined {
                tracing::error!("[BATCH] 工作者异常退出: id={}, error={}", batch_id, e);
            }
        }

        // 5. 未调度的任务标记为失败
        for mut task in worker.queue.drain_pending() {
            task.mark_failed(TaskError::DeadlineExceeded);
            worker.aggregator.lock().record(&task, Instant::now());
        }

        let summary = worker.aggregator.lock().finish(worker.queue.peak_running());
        tracing::info!(
            "[BATCH] 批量任务完成: id={}, completed={}/{}, failed={}, skipped={}, duration={}ms, throughput={:.2}/s",
            batch_id,
            summary.completed_tasks,
            summary.total_tasks,
            summary.failed_tasks,
            summary.skipped_tasks,
            summary.duration_ms,
            summary.throughput_per_sec
        );
        Ok(summary)
    }

    /// 批次预检，失败时不创建任何任务
    fn check_items(&self, items: &[WorkItem]) -> Result<(), SchedulerError> {
        let limit = self.config.max_batch_items;
        if items.len() > limit {
            tracing::warn!("[BATCH] 拒绝批量任务: {} 个条目超过上限 {}", items.len(), limit);
            return Err(SchedulerError::TooManyItems {
                count: items.len(),
                limit,
            });
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in items {
            if item.id.trim().is_empty() {
                return Err(SchedulerError::InvalidInput("工作项 ID 不能为空".to_string()));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(SchedulerError::InvalidInput(format!(
                    "重复的工作项 ID: {}",
                    item.id
                )));
            }
        }
        Ok(())
    }
}

impl Worker {
    /// 执行单个任务：调用执行器 → 报告结果
    async fn run_task(&self, mut task: Task, lease: CredentialLease) {
        task.credential_id = Some(lease.id().to_string());

        let execution =
            AssertUnwindSafe(self.executor.execute(lease.credential(), &task.id)).catch_unwind();
        let outcome =
            match tokio::time::timeout(Duration::from_secs(self.task_timeout_secs), execution).await
            {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(OperationError::Content("执行器异常终止".to_string())),
                Err(_) => Err(OperationError::Timeout(self.task_timeout_secs)),
            };

        if let Err(e) = lease.report(outcome.is_ok()) {
            tracing::warn!("[BATCH] 报告凭证结果失败: {}", e);
        }

        match outcome {
            Ok(value) => task.mark_succeeded(value),
            Err(e) => {
                tracing::warn!(
                    "[BATCH] 任务失败: batch_id={}, task_id={}, error={}",
                    self.batch_id,
                    task.id,
                    e
                );
                task.mark_failed(TaskError::ExternalOperationFailed {
                    reason: e.to_string(),
                });
            }
        }
        self.complete(task);
    }

    fn log_deadline(&self) {
        tracing::warn!(
            "[BATCH] 批量任务到达截止时间，停止调度: id={}, 未调度={}",
            self.batch_id,
            self.queue.pending_len()
        );
    }

    fn complete(&self, task: Task) {
        self.queue.finish();
        self.aggregator.lock().record(&task, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryResultStore;
    use crate::types::{TaskPriority, TaskStatus};
    use async_trait::async_trait;
    use scoutcast_core::credential::{LeasedCredential, PoolConfig, Validity};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 可配置延迟和失败条目的模拟执行器，同时记录并发情况
    #[derive(Default)]
    struct MockExecutor {
        delay: Duration,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        held_credentials: Mutex<HashSet<String>>,
        shared_credential: AtomicUsize,
    }

    impl MockExecutor {
        fn with_delay(ms: u64) -> Self {
            Self {
                delay: Duration::from_millis(ms),
                ..Self::default()
            }
        }

        fn failing(mut self, ids: &[&str]) -> Self {
            self.failing = ids.iter().map(|s| s.to_string()).collect();
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl TaskExecutor for MockExecutor {
        async fn execute(
            &self,
            credential: &LeasedCredential,
            item_id: &str,
        ) -> Result<serde_json::Value, OperationError> {
            self.calls.lock().push(item_id.to_string());
            if !self.held_credentials.lock().insert(credential.id.clone()) {
                self.shared_credential.fetch_add(1, Ordering::SeqCst);
            }
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.held_credentials.lock().remove(&credential.id);

            if self.failing.contains(item_id) {
                return Err(OperationError::RateLimited("HTTP 429".to_string()));
            }
            Ok(serde_json::json!({"item": item_id}))
        }
    }

    struct PanickingExecutor;

    #[async_trait]
    impl TaskExecutor for PanickingExecutor {
        async fn execute(
            &self,
            _credential: &LeasedCredential,
            _item_id: &str,
        ) -> Result<serde_json::Value, OperationError> {
            panic!("executor bug");
        }
    }

    fn pool_with(count: usize) -> Arc<CredentialPool> {
        let secrets: Vec<String> = (0..count).map(|i| format!("session-token-{i}")).collect();
        Arc::new(CredentialPool::from_secrets(secrets, PoolConfig::default()))
    }

    fn scheduler_with(
        pool: Arc<CredentialPool>,
        executor: Arc<dyn TaskExecutor>,
        store: Arc<MemoryResultStore>,
        config: SchedulerConfig,
    ) -> BatchScheduler {
        BatchScheduler::new(pool, executor, store, config)
    }

    fn items(count: usize) -> Vec<WorkItem> {
        (0..count).map(|i| WorkItem::new(format!("post-{i}"))).collect()
    }

    #[tokio::test]
    async fn test_too_many_items_rejected() {
        let executor = Arc::new(MockExecutor::default());
        let scheduler = scheduler_with(
            pool_with(3),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let result = scheduler.run(items(51), BatchOptions::default()).await;
        assert_eq!(
            result,
            Err(SchedulerError::TooManyItems {
                count: 51,
                limit: 50
            })
        );
        assert!(executor.calls().is_empty());
        assert_eq!(scheduler.pool().stats().in_use, 0);
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let executor = Arc::new(MockExecutor::default());
        let scheduler = scheduler_with(
            pool_with(1),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let duplicate = vec![WorkItem::new("post-1"), WorkItem::new("post-1")];
        assert!(matches!(
            scheduler.run(duplicate, BatchOptions::default()).await,
            Err(SchedulerError::InvalidInput(_))
        ));

        let empty = vec![WorkItem::new("  ")];
        assert!(matches!(
            scheduler.run(empty, BatchOptions::default()).await,
            Err(SchedulerError::InvalidInput(_))
        ));
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_all_items_succeed() {
        let executor = Arc::new(MockExecutor::default());
        let scheduler = scheduler_with(
            pool_with(3),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let summary = scheduler.run(items(10), BatchOptions::default()).await.unwrap();

        assert_eq!(summary.total_tasks, 10);
        assert_eq!(summary.completed_tasks, 10);
        assert_eq!(summary.failed_tasks, 0);
        assert_eq!(summary.results.len(), 10);
        assert!(summary.errors.is_empty());
        assert!(summary
            .results
            .iter()
            .all(|r| r.status == TaskStatus::Succeeded && r.credential_id.is_some()));

        let stats = scheduler.pool().stats();
        assert_eq!(stats.valid, 3);
        assert_eq!(stats.in_use, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let executor = Arc::new(MockExecutor::with_delay(30));
        let scheduler = scheduler_with(
            pool_with(10),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let options = BatchOptions {
            max_concurrency: 3,
            ..BatchOptions::default()
        };
        let summary = scheduler.run(items(12), options).await.unwrap();

        assert_eq!(summary.completed_tasks, 12);
        assert!(summary.peak_concurrency <= 3);
        assert!(executor.max_in_flight.load(Ordering::SeqCst) <= 3);
        assert_eq!(executor.shared_credential.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_workers_wait_for_busy_credentials() {
        let executor = Arc::new(MockExecutor::with_delay(20));
        let scheduler = scheduler_with(
            pool_with(2),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let options = BatchOptions {
            max_concurrency: 6,
            ..BatchOptions::default()
        };
        let summary = scheduler.run(items(8), options).await.unwrap();

        assert_eq!(summary.completed_tasks, 8);
        assert!(executor.max_in_flight.load(Ordering::SeqCst) <= 2);
        assert_eq!(executor.shared_credential.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_priority_kept_when_credentials_are_scarce() {
        let executor = Arc::new(MockExecutor::with_delay(5));
        let scheduler = scheduler_with(
            pool_with(1),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let mut batch: Vec<WorkItem> = (0..6)
            .map(|i| WorkItem::new(format!("low-{i}")).with_priority(TaskPriority::Low))
            .collect();
        batch.extend(
            (0..6).map(|i| WorkItem::new(format!("high-{i}")).with_priority(TaskPriority::High)),
        );
        let options = BatchOptions {
            max_concurrency: 12,
            ..BatchOptions::default()
        };
        let summary = scheduler.run(batch, options).await.unwrap();

        assert_eq!(summary.completed_tasks, 12);
        let expected: Vec<String> = (0..6)
            .map(|i| format!("high-{i}"))
            .chain((0..6).map(|i| format!("low-{i}")))
            .collect();
        assert_eq!(executor.calls(), expected);
    }

    #[tokio::test]
    async fn test_dropped_batch_returns_credentials() {
        let executor = Arc::new(MockExecutor::with_delay(500));
        let pool = pool_with(2);
        let scheduler = scheduler_with(
            pool.clone(),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let dropped = tokio::time::timeout(
            Duration::from_millis(50),
            scheduler.run(items(4), BatchOptions::default()),
        )
        .await;
        assert!(dropped.is_err());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(pool.stats().in_use, 0);
        let held = pool.acquire().unwrap();
        pool.release(&held.id).unwrap();

        // 后续批次不会因为残留的占用而挂起
        let summary = tokio::time::timeout(
            Duration::from_secs(2),
            scheduler.run(items(2), BatchOptions::default()),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(summary.completed_tasks, 2);
        assert_eq!(pool.stats().in_use, 0);
    }

    #[tokio::test]
    async fn test_skip_existing_results() {
        let executor = Arc::new(MockExecutor::default());
        let store = Arc::new(MemoryResultStore::new());
        store
            .save_result("post-1", &serde_json::json!({"cached": true}))
            .await
            .unwrap();
        let scheduler = scheduler_with(
            pool_with(2),
            executor.clone(),
            store,
            SchedulerConfig::default(),
        );

        let summary = scheduler.run(items(3), BatchOptions::default()).await.unwrap();

        assert_eq!(summary.completed_tasks, 3);
        assert_eq!(summary.skipped_tasks, 1);
        assert!(!executor.calls().contains(&"post-1".to_string()));

        let skipped = summary.results.iter().find(|r| r.task_id == "post-1").unwrap();
        assert_eq!(skipped.status, TaskStatus::Succeeded);
        assert!(skipped.skipped);
        assert!(skipped.credential_id.is_none());
        assert_eq!(skipped.result, Some(serde_json::json!({"cached": true})));
    }

    #[tokio::test]
    async fn test_skip_can_be_disabled_per_batch_and_item() {
        let executor = Arc::new(MockExecutor::default());
        let store = Arc::new(MemoryResultStore::new());
        store.save_result("post-0", &serde_json::json!(0)).await.unwrap();
        store.save_result("post-1", &serde_json::json!(1)).await.unwrap();
        let scheduler = scheduler_with(
            pool_with(2),
            executor.clone(),
            store,
            SchedulerConfig::default(),
        );

        let options = BatchOptions {
            skip_existing: false,
            ..BatchOptions::default()
        };
        let batch = vec![
            WorkItem::new("post-0"),
            WorkItem::new("post-1").with_skip_if_result_exists(true),
        ];
        let summary = scheduler.run(batch, options).await.unwrap();

        assert_eq!(executor.calls(), vec!["post-0".to_string()]);
        assert_eq!(summary.skipped_tasks, 1);
    }

    #[tokio::test]
    async fn test_dispatch_follows_priority() {
        let executor = Arc::new(MockExecutor::default());
        let scheduler = scheduler_with(
            pool_with(1),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let batch = vec![
            WorkItem::new("low-1").with_priority(TaskPriority::Low),
            WorkItem::new("medium-1"),
            WorkItem::new("high-1").with_priority(TaskPriority::High),
            WorkItem::new("medium-2"),
            WorkItem::new("high-2").with_priority(TaskPriority::High),
        ];
        let options = BatchOptions {
            max_concurrency: 1,
            ..BatchOptions::default()
        };
        scheduler.run(batch, options).await.unwrap();

        assert_eq!(
            executor.calls(),
            vec!["high-1", "high-2", "medium-1", "medium-2", "low-1"]
        );
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let executor = Arc::new(MockExecutor::default().failing(&["post-2", "post-5"]));
        let scheduler = scheduler_with(
            pool_with(4),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let summary = scheduler.run(items(8), BatchOptions::default()).await.unwrap();

        assert_eq!(summary.completed_tasks, 6);
        assert_eq!(summary.failed_tasks, 2);
        assert_eq!(summary.errors.len(), 2);
        assert!(summary.errors["post-2"].contains("HTTP 429"));

        let failed = summary.results.iter().find(|r| r.task_id == "post-5").unwrap();
        assert_eq!(failed.status, TaskStatus::Failed);
        assert!(failed.result.is_none());
        assert!(matches!(
            failed.error,
            Some(TaskError::ExternalOperationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_failing_credential_rotates_out() {
        let executor = Arc::new(MockExecutor::default().failing(&[
            "post-0", "post-1", "post-2", "post-3", "post-4",
        ]));
        let pool = pool_with(1);
        let scheduler = scheduler_with(
            pool.clone(),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let options = BatchOptions {
            max_concurrency: 1,
            ..BatchOptions::default()
        };
        let summary = scheduler.run(items(5), options).await.unwrap();

        assert_eq!(summary.failed_tasks, 5);
        assert_eq!(executor.calls().len(), 3);
        let no_credential = summary
            .results
            .iter()
            .filter(|r| r.error == Some(TaskError::NoCredentialAvailable))
            .count();
        assert_eq!(no_credential, 2);
        assert_eq!(pool.describe_all()[0].validity, Validity::Invalid);
    }

    #[tokio::test]
    async fn test_empty_pool_fails_every_task() {
        let executor = Arc::new(MockExecutor::default());
        let scheduler = scheduler_with(
            pool_with(0),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let summary = scheduler.run(items(4), BatchOptions::default()).await.unwrap();

        assert_eq!(summary.failed_tasks, 4);
        assert_eq!(summary.completed_tasks, 0);
        assert!(executor.calls().is_empty());
        assert!(summary.errors.values().all(|e| e == "没有可用凭证"));
    }

    #[tokio::test]
    async fn test_task_timeout_reports_failure() {
        let executor = Arc::new(MockExecutor::with_delay(3000));
        let pool = pool_with(1);
        let scheduler = scheduler_with(
            pool.clone(),
            executor,
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig {
                task_timeout_secs: 1,
                ..SchedulerConfig::default()
            },
        );

        let summary = scheduler
            .run(vec![WorkItem::new("slow-post")], BatchOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.failed_tasks, 1);
        assert_eq!(summary.errors["slow-post"], "外部操作失败: 任务超时 (1s)");
        let view = &pool.describe_all()[0];
        assert_eq!(view.failure_count, 1);
        assert!(!view.in_use);
    }

    #[tokio::test]
    async fn test_executor_panic_is_contained() {
        let pool = pool_with(1);
        let scheduler = scheduler_with(
            pool.clone(),
            Arc::new(PanickingExecutor),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let summary = scheduler.run(items(2), BatchOptions::default()).await.unwrap();

        assert_eq!(summary.failed_tasks, 2);
        assert_eq!(pool.stats().in_use, 0);
    }

    #[tokio::test]
    async fn test_deadline_stops_new_dispatch() {
        let executor = Arc::new(MockExecutor::with_delay(300));
        let pool = pool_with(1);
        let scheduler = scheduler_with(
            pool.clone(),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let options = BatchOptions {
            max_concurrency: 1,
            deadline_ms: Some(100),
            ..BatchOptions::default()
        };
        let summary = scheduler.run(items(4), options).await.unwrap();

        // 第一个任务已调度，会执行完毕；其余任务不再调度
        assert_eq!(executor.calls(), vec!["post-0".to_string()]);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.failed_tasks, 3);
        assert!(summary
            .results
            .iter()
            .filter(|r| r.status == TaskStatus::Failed)
            .all(|r| r.error == Some(TaskError::DeadlineExceeded)));
        assert_eq!(pool.stats().in_use, 0);
    }

    #[tokio::test]
    async fn test_zero_deadline_dispatches_nothing() {
        let executor = Arc::new(MockExecutor::default());
        let pool = pool_with(2);
        let scheduler = scheduler_with(
            pool.clone(),
            executor.clone(),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let options = BatchOptions {
            deadline_ms: Some(0),
            ..BatchOptions::default()
        };
        let summary = scheduler.run(items(3), options).await.unwrap();

        assert!(executor.calls().is_empty());
        assert_eq!(summary.failed_tasks, 3);
        assert!(summary
            .results
            .iter()
            .all(|r| r.error == Some(TaskError::DeadlineExceeded)));
        assert_eq!(pool.stats().in_use, 0);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let scheduler = scheduler_with(
            pool_with(1),
            Arc::new(MockExecutor::default()),
            Arc::new(MemoryResultStore::new()),
            SchedulerConfig::default(),
        );

        let summary = scheduler.run(Vec::new(), BatchOptions::default()).await.unwrap();
        assert_eq!(summary.total_tasks, 0);
        assert_eq!(summary.throughput_per_sec, 0.0);
    }
}
