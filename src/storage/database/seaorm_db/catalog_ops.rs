use crate::core::models::{CatalogSnapshot, Credential, Provider, RotationSettings};
use crate::storage::CatalogStore;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::super::entities::{self, credential, provider, provider_model, rotation_settings};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Declared models of one provider, sorted
    async fn provider_models(&self, provider_id: &str) -> Result<Vec<String>> {
        let models = entities::ProviderModel::find()
            .filter(provider_model::Column::ProviderId.eq(provider_id))
            .order_by_asc(provider_model::Column::ModelName)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(models.into_iter().map(|m| m.model_name).collect())
    }

    pub(super) async fn load_provider(&self, provider_id: &str) -> Result<Option<Provider>> {
        let Some(model) = entities::Provider::find_by_id(provider_id)
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?
        else {
            return Ok(None);
        };

        let models = self.provider_models(provider_id).await?;
        model.to_domain(models).map(Some)
    }

    pub(super) async fn load_credential(&self, credential_id: &str) -> Result<Option<Credential>> {
        let model = entities::Credential::find_by_id(credential_id)
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(model.map(|m| m.to_domain()))
    }
}

#[async_trait]
impl CatalogStore for SeaOrmDatabase {
    async fn snapshot(&self) -> Result<CatalogSnapshot> {
        debug!("Loading catalog snapshot");

        let providers = entities::Provider::find()
            .order_by_asc(provider::Column::Id)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let mut models_by_provider: HashMap<String, Vec<String>> = HashMap::new();
        for model in entities::ProviderModel::find()
            .order_by_asc(provider_model::Column::ModelName)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?
        {
            models_by_provider
                .entry(model.provider_id)
                .or_default()
                .push(model.model_name);
        }

        let credentials = entities::Credential::find()
            .order_by_asc(credential::Column::Id)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let providers = providers
            .iter()
            .filter_map(|p| {
                match p.to_domain(models_by_provider.remove(&p.id).unwrap_or_default()) {
                    Ok(provider) => Some(provider),
                    Err(e) => {
                        warn!("Skipping provider with unusable vendor kind: {}", e);
                        None
                    }
                }
            })
            .collect();

        Ok(CatalogSnapshot {
            providers,
            credentials: credentials.iter().map(|c| c.to_domain()).collect(),
        })
    }

    async fn rotation_settings(&self) -> Result<RotationSettings> {
        let settings = entities::RotationSettings::find_by_id(rotation_settings::SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(settings.map(|s| s.to_domain()).unwrap_or_default())
    }

    async fn find_provider(&self, id: &str) -> Result<Option<Provider>> {
        self.load_provider(id).await
    }

    async fn find_credential(&self, id: &str) -> Result<Option<Credential>> {
        self.load_credential(id).await
    }

    async fn is_empty(&self) -> Result<bool> {
        let count = entities::Provider::find()
            .count(&self.db)
            .await
            .map_err(GatewayError::Database)?;
        Ok(count == 0)
    }

    async fn insert_provider(&self, provider: &Provider) -> Result<()> {
        debug!("Inserting provider: {}", provider.id);

        let txn = self.db.begin().await.map_err(GatewayError::Database)?;
        insert_provider_rows(&txn, provider).await?;
        txn.commit().await.map_err(GatewayError::Database)?;
        Ok(())
    }

    async fn insert_credential(&self, credential: &Credential) -> Result<()> {
        debug!("Inserting credential: {}", credential.id);
        insert_credential_row(&self.db, credential).await
    }

    async fn save_rotation_settings(&self, settings: &RotationSettings) -> Result<()> {
        upsert_rotation_settings(&self.db, settings).await
    }

    async fn insert_catalog(
        &self,
        rotation: &RotationSettings,
        entries: &[(Provider, Vec<Credential>)],
    ) -> Result<()> {
        debug!("Inserting catalog of {} provider(s)", entries.len());

        // dropping the transaction on error rolls every row back
        let txn = self.db.begin().await.map_err(GatewayError::Database)?;
        upsert_rotation_settings(&txn, rotation).await?;
        for (provider, credentials) in entries {
            insert_provider_rows(&txn, provider).await?;
            for credential in credentials {
                insert_credential_row(&txn, credential).await?;
            }
        }
        txn.commit().await.map_err(GatewayError::Database)?;
        Ok(())
    }
}

async fn insert_provider_rows<C: ConnectionTrait>(conn: &C, provider: &Provider) -> Result<()> {
    entities::Provider::insert(provider::Model::from_domain(provider))
        .exec(conn)
        .await
        .map_err(GatewayError::Database)?;

    if !provider.models.is_empty() {
        let rows = provider.models.iter().map(|model| provider_model::ActiveModel {
            provider_id: Set(provider.id.clone()),
            model_name: Set(model.clone()),
        });
        entities::ProviderModel::insert_many(rows)
            .exec(conn)
            .await
            .map_err(GatewayError::Database)?;
    }
    Ok(())
}

async fn insert_credential_row<C: ConnectionTrait>(conn: &C, credential: &Credential) -> Result<()> {
    entities::Credential::insert(credential::Model::from_domain(credential))
        .exec(conn)
        .await
        .map_err(GatewayError::Database)?;
    Ok(())
}

async fn upsert_rotation_settings<C: ConnectionTrait>(
    conn: &C,
    settings: &RotationSettings,
) -> Result<()> {
    let row = rotation_settings::ActiveModel {
        id: Set(rotation_settings::SINGLETON_ID),
        strategy: Set(settings.strategy.to_string()),
        fallback_enabled: Set(settings.fallback_enabled),
        updated_at: Set(chrono::Utc::now().into()),
    };

    entities::RotationSettings::insert(row)
        .on_conflict(
            OnConflict::column(rotation_settings::Column::Id)
                .update_columns([
                    rotation_settings::Column::Strategy,
                    rotation_settings::Column::FallbackEnabled,
                    rotation_settings::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await
        .map_err(GatewayError::Database)?;
    Ok(())
}
