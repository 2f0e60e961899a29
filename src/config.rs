//! 应用配置
//!
//! 从 YAML 文件加载，所有字段都有默认值；凭证列表和管理令牌可由环境变量覆盖。

use scoutcast_core::credential::{HealthCheckConfig, PoolConfig};
use scoutcast_scheduler::SchedulerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 凭证列表环境变量（逗号分隔）
pub const ENV_CREDENTIALS: &str = "SCOUTCAST_CREDENTIALS";
/// 管理令牌环境变量
pub const ENV_ADMIN_TOKEN: &str = "SCOUTCAST_ADMIN_TOKEN";

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("解析配置文件失败: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("配置无效: {0}")]
    Invalid(String),
}

/// 管理接口配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminConfig {
    /// 管理令牌，为空时管理接口拒绝所有请求
    #[serde(default)]
    pub token: String,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// 会话令牌列表
    #[serde(default)]
    pub credentials: Vec<String>,

    #[serde(default)]
    pub pool: PoolConfig,

    #[serde(default)]
    pub health_check: HealthCheckConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    /// 数据库路径，默认 `~/.scoutcast/scoutcast.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credentials: Vec::new(),
            pool: PoolConfig::default(),
            health_check: HealthCheckConfig::default(),
            scheduler: SchedulerConfig::default(),
            admin: AdminConfig::default(),
            database_path: None,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从 YAML 文件加载配置并应用环境变量覆盖
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("[Config] 加载配置文件: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// 加载配置，文件不存在时使用默认配置
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::warn!("[Config] 配置文件不存在，使用默认配置: {}", path.display());
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_CREDENTIALS) {
            let credentials: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            tracing::info!(
                "[Config] 使用环境变量 {} 中的 {} 个凭证",
                ENV_CREDENTIALS,
                credentials.len()
            );
            self.credentials = credentials;
        }

        if let Some(token) = lookup(ENV_ADMIN_TOKEN) {
            self.admin.token = token.trim().to_string();
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.failure_threshold == 0 {
            return Err(ConfigError::Invalid(
                "pool.failure_threshold 必须大于 0".to_string(),
            ));
        }
        if self.scheduler.max_batch_items == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.max_batch_items 必须大于 0".to_string(),
            ));
        }
        if self.scheduler.task_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.task_timeout_secs 必须大于 0".to_string(),
            ));
        }
        if self.health_check.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "health_check.timeout_secs 必须大于 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 实际使用的数据库路径
    pub fn resolved_database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => scoutcast_core::database::get_db_path().map_err(ConfigError::Invalid),
        }
    }
}
