use crate::core::models::UsageLogEntry;
use crate::storage::UsageLogSink;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use sea_orm::*;

use super::super::entities::{self, usage_log};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Most recent usage log entries, newest first
    pub async fn recent_usage_logs(&self, limit: u64) -> Result<Vec<UsageLogEntry>> {
        let rows = entities::UsageLog::find()
            .order_by_desc(usage_log::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(rows.iter().map(|row| row.to_domain()).collect())
    }
}

#[async_trait]
impl UsageLogSink for SeaOrmDatabase {
    async fn append(&self, entry: &UsageLogEntry) -> Result<()> {
        entities::UsageLog::insert(usage_log::Model::from_domain(entry))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;
        Ok(())
    }
}
