//! 凭证池核心类型和逻辑
//!
//! 包含凭证记录存储、凭证池管理和存活校验。

pub mod health;
pub mod pool;
pub mod store;
pub mod types;

pub use health::{
    classify_status, CheckError, CredentialChecker, HealthCheckConfig, HttpCredentialChecker,
};
pub use pool::{
    CredentialLease, CredentialPool, PoolConfig, PoolError, ValidationOutcome, ValidationReport,
};
pub use store::{CredentialStore, PoolStats};
pub use types::{
    credential_id_for, CredentialRecord, CredentialView, LeasedCredential, SecretValue, Validity,
};
