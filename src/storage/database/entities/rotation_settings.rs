use crate::core::models::{RotationSettings, RotationStrategy};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Id of the single settings row
pub const SINGLETON_ID: i32 = 1;

/// Rotation settings database model (one row)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rotation_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    /// `per_provider` or `global`
    pub strategy: String,

    pub fallback_enabled: bool,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> RotationSettings {
        RotationSettings {
            strategy: self.strategy.parse().unwrap_or(RotationStrategy::PerProvider),
            fallback_enabled: self.fallback_enabled,
        }
    }
}
