//! 凭证存活校验
//!
//! 定义外部存活校验接口，并提供基于 HTTP 的默认实现：
//! 携带会话令牌请求一个需要登录的地址，根据状态码判断令牌是否存活。

use super::types::LeasedCredential;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// 存活校验错误
///
/// 校验本身失败（网络、服务端异常），无法判断令牌是否存活。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("网络错误: {0}")]
    Network(String),

    #[error("无法判定的响应状态: {0}")]
    UnexpectedStatus(u16),

    #[error("校验配置错误: {0}")]
    Config(String),
}

/// 外部存活校验接口
#[async_trait]
pub trait CredentialChecker: Send + Sync {
    /// 返回 `Ok(true)` 表示存活，`Ok(false)` 表示已失效
    async fn check(&self, credential: &LeasedCredential) -> Result<bool, CheckError>;
}

/// 健康检查配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthCheckConfig {
    /// 校验地址（需要登录才能正常访问）
    #[serde(default)]
    pub url: String,

    /// 携带令牌的请求头名称
    #[serde(default = "default_header_name")]
    pub header_name: String,

    /// 请求头内容模板，`{secret}` 会被替换为令牌
    #[serde(default = "default_header_template")]
    pub header_template: String,

    /// 单次校验超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_header_name() -> String {
    "Cookie".to_string()
}

fn default_header_template() -> String {
    "sessionid={secret}".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            header_name: default_header_name(),
            header_template: default_header_template(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// 根据状态码判定令牌是否存活
///
/// 2xx 视为存活，401/403 视为失效，其他状态无法判定。
pub fn classify_status(status: u16) -> Result<bool, CheckError> {
    match status {
        200..=299 => Ok(true),
        401 | 403 => Ok(false),
        other => Err(CheckError::UnexpectedStatus(other)),
    }
}

/// 基于 HTTP 的存活校验器
pub struct HttpCredentialChecker {
    client: reqwest::Client,
    config: HealthCheckConfig,
}

impl HttpCredentialChecker {
    pub fn new(config: HealthCheckConfig) -> Result<Self, CheckError> {
        if config.url.is_empty() {
            return Err(CheckError::Config("未配置校验地址".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CheckError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn header_value(&self, credential: &LeasedCredential) -> String {
        self.config
            .header_template
            .replace("{secret}", credential.secret.expose())
    }
}

#[async_trait]
impl CredentialChecker for HttpCredentialChecker {
    async fn check(&self, credential: &LeasedCredential) -> Result<bool, CheckError> {
        let resp = self
            .client
            .get(&self.config.url)
            .header(self.config.header_name.as_str(), self.header_value(credential))
            .send()
            .await
            .map_err(|e| CheckError::Network(e.without_url().to_string()))?;

        let status = resp.status().as_u16();
        tracing::debug!(
            "[HealthChecker] 凭证 {} 校验响应状态: {}",
            credential.id,
            status
        );
        classify_status(status)
    }
}
