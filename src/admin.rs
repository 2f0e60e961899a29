//! 管理接口
//!
//! 运维人员查看凭证池状态、触发全量校验。所有请求都需要管理令牌。

use crate::app::AppState;
use scoutcast_core::credential::{CredentialView, PoolStats, ValidationReport};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// 管理请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminRequest {
    /// 列出所有凭证（脱敏）
    ListCredentials,
    /// 凭证池统计
    PoolStats,
    /// 全量存活校验
    ValidateAll,
}

/// 管理响应
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AdminResponse {
    Credentials(Vec<CredentialView>),
    PoolStats(PoolStats),
    Validation(ValidationReport),
}

/// 管理接口错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("管理令牌无效")]
    Unauthorized,

    #[error("未配置健康检查地址")]
    HealthCheckUnavailable,
}

/// 校验管理令牌（常量时间比较）
///
/// 支持 `Bearer <token>` 和裸令牌两种写法；未配置令牌时拒绝所有请求。
pub fn verify_admin_token(provided: Option<&str>, expected: &str) -> Result<(), AdminError> {
    if expected.is_empty() {
        return Err(AdminError::Unauthorized);
    }

    let key = match provided {
        Some(s) if s.starts_with("Bearer ") => &s[7..],
        Some(s) => s,
        None => return Err(AdminError::Unauthorized),
    };

    if bool::from(key.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(AdminError::Unauthorized)
    }
}

impl AppState {
    /// 处理一个管理请求
    pub async fn handle_admin(
        &self,
        token: Option<&str>,
        request: AdminRequest,
    ) -> Result<AdminResponse, AdminError> {
        if let Err(e) = verify_admin_token(token, &self.config.admin.token) {
            tracing::warn!("[Admin] 拒绝管理请求: {:?}", request);
            return Err(e);
        }
        tracing::info!("[Admin] 处理管理请求: {:?}", request);

        match request {
            AdminRequest::ListCredentials => Ok(AdminResponse::Credentials(self.pool.describe_all())),
            AdminRequest::PoolStats => Ok(AdminResponse::PoolStats(self.pool.stats())),
            AdminRequest::ValidateAll => self
                .validate_credentials()
                .await
                .map(AdminResponse::Validation)
                .ok_or(AdminError::HealthCheckUnavailable),
        }
    }
}
