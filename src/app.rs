//! 应用状态和启动引导
//!
//! 根据配置组装凭证池、结果存储和批量调度器。

use crate::config::AppConfig;
use anyhow::{anyhow, Context, Result};
use scoutcast_core::credential::{
    CredentialChecker, CredentialPool, HttpCredentialChecker, ValidationReport,
};
use scoutcast_core::database::{self, DbConnection};
use scoutcast_core::logger;
use scoutcast_scheduler::{
    BatchRequest, BatchScheduler, BatchSummary, ResultStore, SchedulerError, SqliteResultStore,
    TaskExecutor, TaskStatus,
};
use std::sync::Arc;

/// 应用状态
pub struct AppState {
    pub config: AppConfig,
    pub db: DbConnection,
    pub pool: Arc<CredentialPool>,
    pub results: Arc<SqliteResultStore>,
    pub scheduler: BatchScheduler,
    checker: Option<Arc<dyn CredentialChecker>>,
}

impl AppState {
    /// 初始化日志、打开数据库并组装所有组件
    pub fn bootstrap(config: AppConfig, executor: Arc<dyn TaskExecutor>) -> Result<Self> {
        logger::init_logging(&config.log_level);

        let db_path = config.resolved_database_path()?;
        let db = database::open_database(&db_path)
            .map_err(|e| anyhow!(e))
            .context("数据库初始化失败")?;

        let mut state = Self::new(config, db, executor)?;
        if !state.config.health_check.url.is_empty() {
            let checker = HttpCredentialChecker::new(state.config.health_check.clone())
                .context("健康检查初始化失败")?;
            state = state.with_checker(Arc::new(checker));
        }

        tracing::info!(
            "[Bootstrap] 启动完成: credentials={}, health_check={}",
            state.pool.len(),
            state.checker.is_some()
        );
        Ok(state)
    }

    /// 用已打开的数据库组装应用状态
    pub fn new(config: AppConfig, db: DbConnection, executor: Arc<dyn TaskExecutor>) -> Result<Self> {
        let results = Arc::new(SqliteResultStore::new(db.clone()).context("结果表初始化失败")?);
        let pool = Arc::new(CredentialPool::from_secrets(
            &config.credentials,
            config.pool.clone(),
        ));
        if pool.is_empty() {
            tracing::warn!("[Bootstrap] 未配置任何凭证，所有任务都将失败");
        }

        let scheduler = BatchScheduler::new(
            pool.clone(),
            executor,
            results.clone(),
            config.scheduler.clone(),
        );

        Ok(Self {
            config,
            db,
            pool,
            results,
            scheduler,
            checker: None,
        })
    }

    pub fn with_checker(mut self, checker: Arc<dyn CredentialChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    /// 执行一个批次，并把新产生的成功结果写回结果存储
    pub async fn submit_batch(&self, request: BatchRequest) -> Result<BatchSummary, SchedulerError> {
        let summary = self.scheduler.run(request.items, request.options).await?;

        let mut saved = 0;
        for result in &summary.results {
            if result.status != TaskStatus::Succeeded || result.skipped {
                continue;
            }
            let Some(value) = &result.result else {
                continue;
            };
            match self.results.save_result(&result.task_id, value).await {
                Ok(()) => saved += 1,
                Err(e) => tracing::warn!("[Bootstrap] 保存结果失败: {} - {}", result.task_id, e),
            }
        }
        tracing::debug!("[Bootstrap] 批次 {} 写回 {} 条结果", summary.batch_id, saved);

        Ok(summary)
    }

    /// 对所有凭证做存活校验
    pub async fn validate_credentials(&self) -> Option<ValidationReport> {
        let checker = self.checker.as_ref()?;
        Some(self.pool.validate_all(checker.as_ref()).await)
    }

    pub fn has_checker(&self) -> bool {
        self.checker.is_some()
    }
}
