use crate::core::models::Credential;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Provider API key database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "provider_api_keys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub provider_id: String,

    pub name: Option<String>,

    #[serde(skip_serializing)]
    pub api_key: String,

    /// Model identifier this key is restricted to
    pub model: Option<String>,

    pub is_active: bool,

    pub priority: i64,

    pub total_requests: i64,

    pub failed_requests: i64,

    #[sea_orm(column_type = "Text", nullable)]
    pub last_error: Option<String>,

    pub last_used_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::provider::Entity",
        from = "Column::ProviderId",
        to = "super::provider::Column::Id"
    )]
    Provider,
}

impl Related<super::provider::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> Credential {
        Credential {
            id: self.id.clone(),
            provider_id: self.provider_id.clone(),
            name: self.name.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            active: self.is_active,
            priority: self.priority,
            total_requests: self.total_requests,
            failed_requests: self.failed_requests,
            last_error: self.last_error.clone(),
            last_used_at: self.last_used_at.map(|dt| dt.with_timezone(&chrono::Utc)),
            created_at: self.created_at.with_timezone(&chrono::Utc),
            updated_at: self.updated_at.with_timezone(&chrono::Utc),
        }
    }

    pub fn from_domain(credential: &Credential) -> ActiveModel {
        ActiveModel {
            id: Set(credential.id.clone()),
            provider_id: Set(credential.provider_id.clone()),
            name: Set(credential.name.clone()),
            api_key: Set(credential.api_key.clone()),
            model: Set(credential.model.clone()),
            is_active: Set(credential.active),
            priority: Set(credential.priority),
            total_requests: Set(credential.total_requests),
            failed_requests: Set(credential.failed_requests),
            last_error: Set(credential.last_error.clone()),
            last_used_at: Set(credential.last_used_at.map(|dt| dt.into())),
            created_at: Set(credential.created_at.into()),
            updated_at: Set(credential.updated_at.into()),
        }
    }
}
