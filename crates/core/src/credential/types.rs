//! 凭证相关类型定义
//!
//! 定义凭证记录、健康状态、脱敏视图等核心类型

use crate::utils::mask_secret;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// 凭证 ID 取哈希的前多少个十六进制字符
const CREDENTIAL_ID_LEN: usize = 16;

/// 会话令牌
///
/// `Debug` / `Display` 只输出掩码，完整内容只能通过 [`SecretValue::expose`] 取得。
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 取得原始令牌（仅用于发起外部请求）
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// 掩码后的令牌
    pub fn masked(&self) -> String {
        mask_secret(&self.0)
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue({})", self.masked())
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// 根据令牌内容派生稳定的凭证 ID（重启后不变）
pub fn credential_id_for(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(CREDENTIAL_ID_LEN);
    id
}

/// 凭证健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    /// 已确认可用
    Valid,
    /// 已下线（连续失败或校验失败）
    Invalid,
    /// 尚未确认
    #[default]
    Unknown,
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// 凭证记录 - 单个凭证的健康状态
///
/// 只能由凭证池修改，工作线程通过 [`LeasedCredential`] 只读使用。
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// 稳定标识符
    pub id: String,
    /// 会话令牌
    pub secret: SecretValue,
    /// 健康状态
    pub validity: Validity,
    /// 最后使用时间
    pub last_used_at: Option<DateTime<Utc>>,
    /// 最后校验时间
    pub last_validated_at: Option<DateTime<Utc>>,
    /// 累计失败次数
    pub failure_count: u64,
    /// 连续失败次数（任一成功即清零）
    pub consecutive_failures: u32,
    /// 是否被在途任务占用
    pub in_use: bool,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// 从令牌创建新记录，状态为 unknown
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = SecretValue::new(secret);
        Self {
            id: credential_id_for(secret.expose()),
            secret,
            validity: Validity::Unknown,
            last_used_at: None,
            last_validated_at: None,
            failure_count: 0,
            consecutive_failures: 0,
            in_use: false,
            created_at: Utc::now(),
        }
    }

    /// 是否可参与选择（非 invalid 且未被占用）
    pub fn is_selectable(&self) -> bool {
        self.validity != Validity::Invalid && !self.in_use
    }

    /// 更新最后使用时间
    pub fn mark_used(&mut self) {
        self.last_used_at = Some(Utc::now());
    }

    /// 记录一次成功使用
    ///
    /// 已下线的凭证只能通过存活校验恢复，成功使用不会改变其状态。
    pub fn record_success(&mut self) {
        if self.validity != Validity::Invalid {
            self.validity = Validity::Valid;
        }
        self.consecutive_failures = 0;
        self.mark_used();
    }

    /// 记录一次失败使用
    ///
    /// 返回本次失败是否使凭证被下线。
    pub fn record_failure(&mut self, threshold: u32) -> bool {
        self.failure_count += 1;
        self.consecutive_failures += 1;
        if self.validity != Validity::Invalid && self.consecutive_failures >= threshold {
            self.validity = Validity::Invalid;
            return true;
        }
        false
    }

    /// 应用一次存活校验结果
    ///
    /// `None` 表示校验本身出错，状态回到 unknown。
    pub fn apply_validation(&mut self, live: Option<bool>) {
        self.last_validated_at = Some(Utc::now());
        self.validity = match live {
            Some(true) => {
                self.consecutive_failures = 0;
                Validity::Valid
            }
            Some(false) => Validity::Invalid,
            None => Validity::Unknown,
        };
    }

    /// 生成脱敏视图
    pub fn view(&self) -> CredentialView {
        CredentialView {
            id: self.id.clone(),
            masked_value: self.secret.masked(),
            validity: self.validity,
            in_use: self.in_use,
            last_used_at: self.last_used_at,
            last_validated_at: self.last_validated_at,
            failure_count: self.failure_count,
            consecutive_failures: self.consecutive_failures,
        }
    }

    /// 生成供工作线程使用的只读句柄
    pub fn lease(&self) -> LeasedCredential {
        LeasedCredential {
            id: self.id.clone(),
            secret: self.secret.clone(),
        }
    }
}

/// 凭证脱敏视图（仅用于观测，不可还原令牌）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialView {
    pub id: String,
    pub masked_value: String,
    pub validity: Validity,
    pub in_use: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub last_validated_at: Option<DateTime<Utc>>,
    pub failure_count: u64,
    pub consecutive_failures: u32,
}

/// 已借出的凭证 - 工作线程只读取 ID 和令牌
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeasedCredential {
    pub id: String,
    pub secret: SecretValue,
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_record_new() {
        let record = CredentialRecord::new("sessionid-abcdefghijklmn");

        assert_eq!(record.validity, Validity::Unknown);
        assert_eq!(record.id.len(), CREDENTIAL_ID_LEN);
        assert!(record.last_used_at.is_none());
        assert!(record.last_validated_at.is_none());
        assert!(record.is_selectable());
    }

    #[test]
    fn test_credential_id_is_stable() {
        let a = credential_id_for("token-1");
        let b = credential_id_for("token-1");
        let c = credential_id_for("token-2");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_secret_never_formatted_in_full() {
        let secret = SecretValue::new("sessionid=0123456789abcdef");

        assert!(!format!("{secret:?}").contains("0123456789abcdef"));
        assert!(!format!("{secret}").contains("0123456789abcdef"));
        assert_eq!(secret.expose(), "sessionid=0123456789abcdef");
    }

    #[test]
    fn test_record_failure_threshold() {
        let mut record = CredentialRecord::new("token");

        assert!(!record.record_failure(3));
        assert!(!record.record_failure(3));
        assert_eq!(record.validity, Validity::Unknown);

        assert!(record.record_failure(3));
        assert_eq!(record.validity, Validity::Invalid);
        assert_eq!(record.failure_count, 3);
        assert_eq!(record.consecutive_failures, 3);

        // 已下线后再失败不再重复报告下线
        assert!(!record.record_failure(3));
    }

    #[test]
    fn test_record_success_resets_streak() {
        let mut record = CredentialRecord::new("token");

        record.record_failure(3);
        record.record_failure(3);
        record.record_success();

        assert_eq!(record.validity, Validity::Valid);
        assert_eq!(record.consecutive_failures, 0);
        assert_eq!(record.failure_count, 2);
        assert!(record.last_used_at.is_some());
    }

    #[test]
    fn test_record_success_does_not_revive_invalid() {
        let mut record = CredentialRecord::new("token");
        for _ in 0..3 {
            record.record_failure(3);
        }

        record.record_success();
        assert_eq!(record.validity, Validity::Invalid);
        assert_eq!(record.consecutive_failures, 0);
    }

    #[test]
    fn test_apply_validation() {
        let mut record = CredentialRecord::new("token");
        for _ in 0..3 {
            record.record_failure(3);
        }

        record.apply_validation(Some(true));
        assert_eq!(record.validity, Validity::Valid);
        assert_eq!(record.consecutive_failures, 0);
        assert!(record.last_validated_at.is_some());

        record.apply_validation(None);
        assert_eq!(record.validity, Validity::Unknown);

        record.apply_validation(Some(false));
        assert_eq!(record.validity, Validity::Invalid);
        assert!(!record.is_selectable());
    }

    #[test]
    fn test_view_is_masked() {
        let record = CredentialRecord::new("abcdefghijklmnopqrstuvwxyz");
        let view = record.view();

        assert_eq!(view.masked_value, "abcdef****");
        assert_eq!(view.id, record.id);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("qrstuvwxyz"));
    }
}
