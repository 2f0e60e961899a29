//! 凭证池实现
//!
//! 单一的凭证存储由一把读写锁保护，所有健康状态的修改都经由
//! `acquire` / `report_outcome` / `release` / `validate_all` 完成。
//! 借出的凭证在报告结果前被标记为占用，不会同时借给两个任务。

use super::health::CredentialChecker;
use super::store::{CredentialStore, PoolStats};
use super::types::{CredentialView, LeasedCredential, Validity};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Notify;

/// 凭证池配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    /// 连续失败多少次后下线凭证 (默认为 3)
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
}

fn default_failure_threshold() -> u32 {
    3
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
        }
    }
}

/// 凭证池错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// 没有非 invalid 的凭证
    #[error("没有可用的健康凭证")]
    NoHealthyCredential,
    /// 健康凭证都被在途任务占用
    #[error("所有健康凭证均被占用 ({0} 个)")]
    AllInUse(usize),
    /// 凭证不存在
    #[error("凭证不存在: {0}")]
    CredentialNotFound(String),
}

/// 单个凭证的校验结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub id: String,
    pub masked_value: String,
    pub validity: Validity,
    /// 校验本身出错时的错误描述
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 全量校验报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checked_at: DateTime<Utc>,
    pub stats: PoolStats,
    pub outcomes: Vec<ValidationOutcome>,
}

/// 凭证池 - 负责凭证的选择、健康反馈和轮换
pub struct CredentialPool {
    store: RwLock<CredentialStore>,
    config: PoolConfig,
    /// 凭证被归还或状态变化时唤醒等待者
    released: Notify,
}

impl CredentialPool {
    /// 创建新的凭证池
    pub fn new(store: CredentialStore, config: PoolConfig) -> Self {
        Self {
            store: RwLock::new(store),
            config,
            released: Notify::new(),
        }
    }

    /// 从配置的令牌列表创建凭证池
    pub fn from_secrets<I, S>(secrets: I, config: PoolConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pool = Self::new(CredentialStore::from_secrets(secrets), config);
        tracing::info!("[CredentialPool] 初始化凭证池: {} 个凭证", pool.len());
        pool
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// 借出最久未使用的健康凭证
    ///
    /// # 错误
    /// - 没有非 invalid 凭证时返回 `PoolError::NoHealthyCredential`
    /// - 健康凭证都被占用时返回 `PoolError::AllInUse`
    pub fn acquire(&self) -> Result<LeasedCredential, PoolError> {
        let mut store = self.store.write();
        if !store.has_non_invalid() {
            return Err(PoolError::NoHealthyCredential);
        }

        let id = match store.least_recently_used() {
            Some(record) => record.id.clone(),
            None => return Err(PoolError::AllInUse(store.stats().in_use)),
        };
        let record = store
            .get_mut(&id)
            .ok_or_else(|| PoolError::CredentialNotFound(id.clone()))?;

        record.in_use = true;
        record.mark_used();
        tracing::debug!(
            "[CredentialPool] 借出凭证: {} ({})",
            record.id,
            record.secret.masked()
        );
        Ok(record.lease())
    }

    /// 借出凭证，健康凭证都被占用时等待归还
    ///
    /// 没有非 invalid 凭证时立即失败，不会等待。
    pub async fn acquire_wait(&self) -> Result<LeasedCredential, PoolError> {
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.acquire() {
                Err(PoolError::AllInUse(_)) => notified.await,
                other => return other,
            }
        }
    }

    /// 借出凭证并包装为租约，必要时等待归还
    ///
    /// 租约未报告结果就被丢弃时会自动归还凭证。
    pub async fn lease_wait(self: &Arc<Self>) -> Result<CredentialLease, PoolError> {
        let credential = self.acquire_wait().await?;
        Ok(CredentialLease {
            pool: Arc::clone(self),
            credential,
            settled: false,
        })
    }

    /// 报告一次使用结果并归还凭证
    pub fn report_outcome(&self, id: &str, success: bool) -> Result<(), PoolError> {
        {
            let mut store = self.store.write();
            let record = store
                .get_mut(id)
                .ok_or_else(|| PoolError::CredentialNotFound(id.to_string()))?;

            record.in_use = false;
            if success {
                record.record_success();
            } else if record.record_failure(self.config.failure_threshold) {
                tracing::warn!(
                    "[CredentialPool] 凭证 {} 连续失败 {} 次，已下线",
                    record.id,
                    record.consecutive_failures
                );
            }
            debug_assert!(u64::from(record.consecutive_failures) <= record.failure_count);
        }
        self.released.notify_waiters();
        Ok(())
    }

    /// 不带结果地归还凭证（任务未实际使用凭证时）
    pub fn release(&self, id: &str) -> Result<(), PoolError> {
        {
            let mut store = self.store.write();
            let record = store
                .get_mut(id)
                .ok_or_else(|| PoolError::CredentialNotFound(id.to_string()))?;
            record.in_use = false;
        }
        self.released.notify_waiters();
        Ok(())
    }

    /// 对所有凭证做一次存活校验
    ///
    /// 不论当前状态如何都会校验，这是 invalid 凭证恢复的唯一途径。
    /// 单个凭证校验失败只体现为状态变化，本方法总是返回汇总报告。
    pub async fn validate_all(&self, checker: &dyn CredentialChecker) -> ValidationReport {
        let snapshot: Vec<LeasedCredential> = self.store.read().iter().map(|r| r.lease()).collect();
        tracing::info!("[CredentialPool] 开始校验 {} 个凭证", snapshot.len());

        let checks = snapshot.iter().map(|credential| async move {
            (credential.id.clone(), checker.check(credential).await)
        });
        let results = futures::future::join_all(checks).await;

        let mut outcomes = Vec::with_capacity(results.len());
        {
            let mut store = self.store.write();
            for (id, result) in results {
                let Some(record) = store.get_mut(&id) else {
                    continue;
                };
                let (live, error) = match result {
                    Ok(live) => (Some(live), None),
                    Err(e) => {
                        tracing::warn!("[CredentialPool] 凭证 {} 校验出错: {}", id, e);
                        (None, Some(e.to_string()))
                    }
                };
                record.apply_validation(live);
                if live == Some(false) {
                    tracing::warn!("[CredentialPool] 凭证 {} 校验未通过，已下线", id);
                }
                outcomes.push(ValidationOutcome {
                    id,
                    masked_value: record.secret.masked(),
                    validity: record.validity,
                    error,
                });
            }
        }
        self.released.notify_waiters();

        let stats = self.stats();
        tracing::info!(
            "[CredentialPool] 校验完成: valid={}, invalid={}, unknown={}",
            stats.valid,
            stats.invalid,
            stats.unknown
        );
        ValidationReport {
            checked_at: Utc::now(),
            stats,
            outcomes,
        }
    }

    /// 获取池状态（无副作用）
    pub fn stats(&self) -> PoolStats {
        self.store.read().stats()
    }

    /// 获取单个凭证的脱敏视图
    pub fn describe(&self, id: &str) -> Option<CredentialView> {
        self.store.read().get(id).map(|r| r.view())
    }

    /// 获取所有凭证的脱敏视图
    pub fn describe_all(&self) -> Vec<CredentialView> {
        self.store.read().iter().map(|r| r.view()).collect()
    }
}

/// 凭证租约
///
/// 持有期间凭证保持占用；`report` 报告结果后归还，直接丢弃则不带结果归还。
pub struct CredentialLease {
    pool: Arc<CredentialPool>,
    credential: LeasedCredential,
    settled: bool,
}

impl CredentialLease {
    pub fn credential(&self) -> &LeasedCredential {
        &self.credential
    }

    pub fn id(&self) -> &str {
        &self.credential.id
    }

    /// 报告使用结果并归还凭证
    pub fn report(mut self, success: bool) -> Result<(), PoolError> {
        self.settled = true;
        self.pool.report_outcome(&self.credential.id, success)
    }
}

impl Drop for CredentialLease {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::debug!("[CredentialPool] 租约未报告结果，归还凭证: {}", self.credential.id);
        if let Err(e) = self.pool.release(&self.credential.id) {
            tracing::warn!("[CredentialPool] 归还凭证失败: {}", e);
        }
    }
}
