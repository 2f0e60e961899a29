//! 分析结果数据访问对象 (DAO)
//!
//! 基于 SQLite 的结果存储

use crate::store::ResultStore;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use scoutcast_core::database::{lock_db, DbConnection};

/// SQLite 结果存储
pub struct SqliteResultStore {
    db: DbConnection,
}

impl SqliteResultStore {
    /// 创建存储并初始化表
    pub fn new(db: DbConnection) -> Result<Self> {
        Self::init_tables(&db)?;
        Ok(Self { db })
    }

    /// 初始化数据库表
    pub fn init_tables(db: &DbConnection) -> Result<()> {
        let conn = lock_db(db).map_err(|e| anyhow!(e))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS analysis_results (
                item_id TEXT PRIMARY KEY,
                result_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("创建 analysis_results 表失败")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_analysis_results_updated_at ON analysis_results(updated_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// 根据工作项 ID 查询结果
    pub fn get(&self, item_id: &str) -> Result<Option<serde_json::Value>> {
        let conn = lock_db(&self.db).map_err(|e| anyhow!(e))?;

        let json: Option<String> = conn
            .query_row(
                "SELECT result_json FROM analysis_results WHERE item_id = ?1",
                params![item_id],
                |row| row.get(0),
            )
            .optional()
            .context("查询分析结果失败")?;

        json.as_deref()
            .map(serde_json::from_str::<serde_json::Value>)
            .transpose()
            .context("解析分析结果失败")
    }

    /// 保存结果（已存在则更新）
    pub fn save(&self, item_id: &str, result: &serde_json::Value) -> Result<()> {
        let conn = lock_db(&self.db).map_err(|e| anyhow!(e))?;
        let now = chrono::Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO analysis_results (item_id, result_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(item_id) DO UPDATE SET
                result_json = excluded.result_json,
                updated_at = excluded.updated_at",
            params![item_id, serde_json::to_string(result)?, now],
        )
        .context("保存分析结果失败")?;

        Ok(())
    }

    /// 删除结果
    pub fn delete(&self, item_id: &str) -> Result<bool> {
        let conn = lock_db(&self.db).map_err(|e| anyhow!(e))?;
        let affected = conn.execute(
            "DELETE FROM analysis_results WHERE item_id = ?1",
            params![item_id],
        )?;
        Ok(affected > 0)
    }

    /// 结果总数
    pub fn count(&self) -> Result<usize> {
        let conn = lock_db(&self.db).map_err(|e| anyhow!(e))?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM analysis_results", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl ResultStore for SqliteResultStore {
    async fn get_existing_result(&self, item_id: &str) -> Result<Option<serde_json::Value>> {
        self.get(item_id)
    }

    async fn save_result(&self, item_id: &str, result: &serde_json::Value) -> Result<()> {
        self.save(item_id, result)
    }
}
