use crate::core::models::{Provider, VendorKind};
use crate::utils::error::GatewayError;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Upstream provider database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub base_url: String,

    /// `google`, `anthropic` or `openai_compatible`
    pub vendor_kind: String,

    pub is_active: bool,

    pub priority: i64,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::provider_model::Entity")]
    Models,
    #[sea_orm(has_many = "super::credential::Entity")]
    Credentials,
}

impl Related<super::provider_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Models.def()
    }
}

impl Related<super::credential::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credentials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain provider
    ///
    /// Fails on a vendor tag that names no known adapter.
    pub fn to_domain(&self, models: Vec<String>) -> crate::utils::error::Result<Provider> {
        let vendor_kind: VendorKind = self.vendor_kind.parse().map_err(|e| {
            GatewayError::Storage(format!("provider {}: {}", self.id, e))
        })?;

        Ok(Provider {
            id: self.id.clone(),
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            vendor_kind,
            active: self.is_active,
            priority: self.priority,
            models,
        })
    }

    pub fn from_domain(provider: &Provider) -> ActiveModel {
        let now = chrono::Utc::now();
        ActiveModel {
            id: Set(provider.id.clone()),
            name: Set(provider.name.clone()),
            base_url: Set(provider.base_url.clone()),
            vendor_kind: Set(provider.vendor_kind.to_string()),
            is_active: Set(provider.active),
            priority: Set(provider.priority),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}
