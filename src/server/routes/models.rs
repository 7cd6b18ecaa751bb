//! Model listing endpoint

use crate::core::models::CatalogSnapshot;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// OpenAI-style model entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    pub id: String,
    pub object: &'static str,
    pub owned_by: String,
}

/// OpenAI-style model list
#[derive(Debug, Clone, Serialize)]
pub struct ModelListResponse {
    pub object: &'static str,
    pub data: Vec<ModelEntry>,
}

/// List the models declared by active providers
///
/// A model served by several providers is listed once, owned by the
/// highest-priority provider.
pub async fn list_models(state: web::Data<AppState>) -> Result<HttpResponse, GatewayError> {
    debug!("Listing available models");

    let snapshot = state.storage.catalog.snapshot().await?;
    Ok(HttpResponse::Ok().json(ModelListResponse {
        object: "list",
        data: model_entries(&snapshot),
    }))
}

pub(crate) fn model_entries(snapshot: &CatalogSnapshot) -> Vec<ModelEntry> {
    let mut providers: Vec<_> = snapshot.providers.iter().filter(|p| p.active).collect();
    providers.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

    let mut models: BTreeMap<&str, &str> = BTreeMap::new();
    for provider in providers {
        for model in &provider.models {
            models.entry(model.as_str()).or_insert(provider.name.as_str());
        }
    }

    models
        .into_iter()
        .map(|(id, owner)| ModelEntry {
            id: id.to_string(),
            object: "model",
            owned_by: owner.to_string(),
        })
        .collect()
}
