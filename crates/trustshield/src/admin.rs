//! Sources of admin action logs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::EngineResult;
use crate::utils::time::minutes_ago_rfc3339;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdminLogEntry {
    pub timestamp: String,
    pub user: String,
    pub action: String,
    pub status: String,
}

#[async_trait]
pub trait AdminLogSource: Send + Sync {
    async fn fetch(&self) -> EngineResult<Vec<AdminLogEntry>>;
}

/// Four canned entries stamped relative to the time of the fetch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedAdminLogs;

#[async_trait]
impl AdminLogSource for SimulatedAdminLogs {
    async fn fetch(&self) -> EngineResult<Vec<AdminLogEntry>> {
        let entry = |minutes: u64, user: &str, action: &str, status: &str| AdminLogEntry {
            timestamp: minutes_ago_rfc3339(minutes),
            user: user.to_string(),
            action: action.to_string(),
            status: status.to_string(),
        };
        Ok(vec![
            entry(5, "alice", "Accessed sales reports", "Success"),
            entry(10, "bob", "Modified product pricing", "Success"),
            entry(
                15,
                "charlie",
                "Attempted to download customer data",
                "Blocked - Insufficient Permissions",
            ),
            entry(20, "alice", "Updated security settings", "Success"),
        ])
    }
}

/// Fixed entries, for tests and replays.
#[derive(Debug, Default, Clone)]
pub struct StaticAdminLogs {
    entries: Vec<AdminLogEntry>,
}

impl StaticAdminLogs {
    pub fn new(entries: Vec<AdminLogEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl AdminLogSource for StaticAdminLogs {
    async fn fetch(&self) -> EngineResult<Vec<AdminLogEntry>> {
        Ok(self.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_logs_include_one_download_attempt() {
        let entries = SimulatedAdminLogs.fetch().await.expect("fetch");
        assert_eq!(entries.len(), 4);
        let downloads: Vec<_> = entries
            .iter()
            .filter(|e| e.action.contains("download customer data"))
            .collect();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].user, "charlie");
    }
}
