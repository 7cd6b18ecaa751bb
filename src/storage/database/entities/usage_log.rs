use crate::core::models::{AttemptStatus, UsageLogEntry};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Usage log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "api_usage_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub provider_id: Option<String>,

    pub provider_key_id: Option<String>,

    pub model_name: String,

    pub request_path: String,

    /// `success` or `error`
    pub status: String,

    pub status_code: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    pub response_time_ms: i64,

    pub tokens_used: Option<i64>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> UsageLogEntry {
        UsageLogEntry {
            id: self.id,
            created_at: self.created_at.with_timezone(&chrono::Utc),
            provider_id: self.provider_id.clone(),
            credential_id: self.provider_key_id.clone(),
            model_name: self.model_name.clone(),
            request_path: self.request_path.clone(),
            status: if self.status == AttemptStatus::Success.as_str() {
                AttemptStatus::Success
            } else {
                AttemptStatus::Error
            },
            status_code: self.status_code.and_then(|c| u16::try_from(c).ok()),
            error_message: self.error_message.clone(),
            latency_ms: u64::try_from(self.response_time_ms).unwrap_or_default(),
            tokens_used: self.tokens_used.and_then(|t| u32::try_from(t).ok()),
        }
    }

    pub fn from_domain(entry: &UsageLogEntry) -> ActiveModel {
        ActiveModel {
            id: Set(entry.id),
            provider_id: Set(entry.provider_id.clone()),
            provider_key_id: Set(entry.credential_id.clone()),
            model_name: Set(entry.model_name.clone()),
            request_path: Set(entry.request_path.clone()),
            status: Set(entry.status.as_str().to_string()),
            status_code: Set(entry.status_code.map(i32::from)),
            error_message: Set(entry.error_message.clone()),
            response_time_ms: Set(i64::try_from(entry.latency_ms).unwrap_or(i64::MAX)),
            tokens_used: Set(entry.tokens_used.map(i64::from)),
            created_at: Set(entry.created_at.into()),
        }
    }
}
