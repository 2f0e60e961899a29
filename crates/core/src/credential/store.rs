//! 凭证记录存储
//!
//! 按插入顺序保存凭证记录，提供候选选择和状态统计。
//! 本身不加锁，由 [`super::pool::CredentialPool`] 负责互斥。

use super::types::{CredentialRecord, Validity};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 凭证池统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// 总凭证数
    pub total: usize,
    /// 可用凭证数
    pub valid: usize,
    /// 已下线凭证数
    pub invalid: usize,
    /// 未确认凭证数
    pub unknown: usize,
    /// 被在途任务占用的凭证数
    pub in_use: usize,
}

/// 凭证记录存储（id -> CredentialRecord）
#[derive(Debug, Default)]
pub struct CredentialStore {
    records: IndexMap<String, CredentialRecord>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从配置的令牌列表构建存储
    ///
    /// 空令牌被忽略，重复令牌（相同 ID）只保留第一个。
    pub fn from_secrets<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        for secret in secrets {
            let secret = secret.as_ref().trim();
            if secret.is_empty() {
                continue;
            }
            let record = CredentialRecord::new(secret);
            let id = record.id.clone();
            if !store.insert(record) {
                tracing::warn!("[CredentialStore] 忽略重复凭证: {}", id);
            }
        }
        store
    }

    /// 插入记录，ID 已存在时返回 false 且不覆盖
    pub fn insert(&mut self, record: CredentialRecord) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.records.insert(record.id.clone(), record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CredentialRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CredentialRecord> {
        self.records.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CredentialRecord> {
        self.records.values()
    }

    /// 是否还有非 invalid 的凭证（不论是否被占用）
    pub fn has_non_invalid(&self) -> bool {
        self.records
            .values()
            .any(|r| r.validity != Validity::Invalid)
    }

    /// 选出最久未使用的可选凭证
    ///
    /// 排序键：最后使用时间（从未使用最优先）→ 连续失败数 → 累计失败数 → 插入顺序。
    pub fn least_recently_used(&self) -> Option<&CredentialRecord> {
        self.records
            .values()
            .enumerate()
            .filter(|(_, r)| r.is_selectable())
            .min_by_key(|(index, r)| {
                (
                    r.last_used_at,
                    r.consecutive_failures,
                    r.failure_count,
                    *index,
                )
            })
            .map(|(_, r)| r)
    }

    /// 统计各状态数量
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats {
            total: self.records.len(),
            ..PoolStats::default()
        };
        for record in self.records.values() {
            match record.validity {
                Validity::Valid => stats.valid += 1,
                Validity::Invalid => stats.invalid += 1,
                Validity::Unknown => stats.unknown += 1,
            }
            if record.in_use {
                stats.in_use += 1;
            }
        }
        stats
    }
}
