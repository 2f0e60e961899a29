//! ScoutCast Core Crate
//!
//! 包含凭证池和无业务依赖的基础模块。
//!
//! ## 模块结构
//! - `credential`: 凭证记录存储、凭证池、存活校验
//! - `database`: SQLite 连接辅助
//! - `logger`: 日志配置
//! - `utils`: 通用工具（令牌掩码）

// 凭证池核心（types, store, pool, health）
pub mod credential;

pub mod database;
pub mod logger;
pub mod utils;

// 重新导出常用类型
pub use credential::{
    CredentialChecker, CredentialLease, CredentialPool, CredentialView, LeasedCredential, PoolConfig, PoolError,
    PoolStats, ValidationReport, Validity,
};
