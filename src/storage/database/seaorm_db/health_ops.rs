use crate::core::models::{Credential, Provider};
use crate::storage::{HealthStore, PriorityDecay};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Query, SimpleExpr};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, credential, provider};
use super::types::SeaOrmDatabase;

/// `CASE` expression applying `decay` to `column` inside the UPDATE itself
fn decayed<C: ColumnTrait>(column: C, decay: PriorityDecay) -> SimpleExpr {
    let lowered = Expr::col(column).sub(decay.step);
    Expr::case(Expr::expr(lowered.clone()).gt(decay.floor), lowered)
        .case(Expr::col(column).gt(decay.floor), Expr::val(decay.floor))
        .finally(Expr::col(column))
        .into()
}

#[async_trait]
impl HealthStore for SeaOrmDatabase {
    async fn record_success(
        &self,
        credential_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Credential>> {
        debug!("Recording success for credential: {}", credential_id);
        let at: DateTimeWithTimeZone = at.into();

        let result = entities::Credential::update_many()
            .col_expr(
                credential::Column::TotalRequests,
                Expr::col(credential::Column::TotalRequests).add(1),
            )
            .col_expr(credential::Column::LastError, Expr::value(Option::<String>::None))
            .col_expr(credential::Column::LastUsedAt, Expr::value(at))
            .col_expr(credential::Column::UpdatedAt, Expr::value(at))
            .filter(credential::Column::Id.eq(credential_id))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.load_credential(credential_id).await
    }

    async fn record_failure(
        &self,
        credential_id: &str,
        message: &str,
        decay: Option<PriorityDecay>,
        at: DateTime<Utc>,
    ) -> Result<Option<Credential>> {
        debug!("Recording failure for credential: {}", credential_id);
        let at: DateTimeWithTimeZone = at.into();

        let mut update = entities::Credential::update_many()
            .col_expr(
                credential::Column::FailedRequests,
                Expr::col(credential::Column::FailedRequests).add(1),
            )
            .col_expr(credential::Column::LastError, Expr::value(message))
            .col_expr(credential::Column::LastUsedAt, Expr::value(at))
            .col_expr(credential::Column::UpdatedAt, Expr::value(at));

        if let Some(decay) = decay {
            update = update.col_expr(
                credential::Column::Priority,
                decayed(credential::Column::Priority, decay),
            );
        }

        let result = update
            .filter(credential::Column::Id.eq(credential_id))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.load_credential(credential_id).await
    }

    async fn decay_provider_if_exhausted(
        &self,
        provider_id: &str,
        threshold: i64,
        decay: PriorityDecay,
    ) -> Result<Option<Provider>> {
        let healthy_key_exists = Expr::exists(
            Query::select()
                .expr(Expr::val(1))
                .from(entities::Credential)
                .and_where(
                    Expr::col((entities::Credential, credential::Column::ProviderId))
                        .eq(provider_id),
                )
                .and_where(Expr::col((entities::Credential, credential::Column::IsActive)).eq(true))
                .and_where(
                    Expr::col((entities::Credential, credential::Column::Priority)).gt(threshold),
                )
                .to_owned(),
        );

        let result = entities::Provider::update_many()
            .col_expr(
                provider::Column::Priority,
                decayed(provider::Column::Priority, decay),
            )
            .col_expr(
                provider::Column::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(provider::Column::Id.eq(provider_id))
            .filter(healthy_key_exists.not())
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        debug!("Provider {} has no healthy credential left, demoted", provider_id);
        self.load_provider(provider_id).await
    }

    async fn set_credential_priority(
        &self,
        credential_id: &str,
        priority: i64,
    ) -> Result<Option<Credential>> {
        let result = entities::Credential::update_many()
            .col_expr(credential::Column::Priority, Expr::value(priority))
            .col_expr(
                credential::Column::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(credential::Column::Id.eq(credential_id))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.load_credential(credential_id).await
    }
}
