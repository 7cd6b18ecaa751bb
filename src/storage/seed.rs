//! Startup seeding of the provider catalog

use super::CatalogStore;
use crate::config::ProviderConfig;
use crate::core::models::RotationSettings;
use crate::utils::error::{GatewayError, Result};
use tracing::{debug, info};

/// Write the configured providers and rotation settings into an empty store
///
/// Returns the number of providers written; a store that already holds a
/// provider is left untouched. Every provider is resolved before anything is
/// written, and the catalog is stored as one unit, so a bad entry leaves the
/// store empty and the next start seeds again.
pub async fn seed_catalog(
    catalog: &dyn CatalogStore,
    providers: &[ProviderConfig],
    rotation: &RotationSettings,
) -> Result<usize> {
    if !catalog.is_empty().await? {
        debug!("Catalog already populated, skipping seed");
        return Ok(0);
    }

    let entries = providers
        .iter()
        .map(|config| {
            config
                .to_domain()
                .map_err(|e| GatewayError::Config(format!("Provider {}: {}", config.name, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    catalog.insert_catalog(rotation, &entries).await?;

    for (provider, credentials) in &entries {
        info!(
            "Seeded provider {} ({}) with {} credential(s)",
            provider.name,
            provider.vendor_kind,
            credentials.len()
        );
    }

    Ok(entries.len())
}
