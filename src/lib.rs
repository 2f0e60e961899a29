//! ScoutCast - 凭证轮换的批量抓取分析服务
//!
//! ## Workspace 结构
//! - scoutcast-core crate（凭证池、存活校验、数据库、日志）
//! - scoutcast-scheduler crate（任务队列、批量调度、结果汇总、结果存储）
//! - 主 crate 负责配置加载、启动组装和管理接口

pub mod admin;
pub mod app;
pub mod config;

pub use admin::{verify_admin_token, AdminError, AdminRequest, AdminResponse};
pub use app::AppState;
pub use config::{AdminConfig, AppConfig, ConfigError};

// 重新导出子 crate 的常用类型
pub use scoutcast_core::credential::{CredentialPool, PoolConfig, PoolError, Validity};
pub use scoutcast_scheduler::{
    BatchOptions, BatchRequest, BatchScheduler, BatchSummary, SchedulerConfig, SchedulerError,
    TaskExecutor, WorkItem,
};
