//! Candidate selection
//!
//! Turns a catalog snapshot into the ordered list of (provider, credential)
//! pairs a request will try. Selection is a pure function of its inputs.

use crate::core::models::{
    Candidate, CatalogSnapshot, Credential, Provider, RotationSettings, RotationStrategy,
};
use std::cmp::Reverse;

/// Builds the ordered candidate list for one request
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateSelector;

impl CandidateSelector {
    /// Select candidates for `model` (`None` matches every provider)
    ///
    /// # Flow
    ///
    /// 1. Keep active providers that declare `model`
    /// 2. Order providers by priority desc, then id asc
    /// 3. Per provider, keep active credentials allowed to serve `model`,
    ///    ordered by priority desc, then id asc
    /// 4. Without fallback, keep only the highest-priority provider
    /// 5. Concatenate per provider, or merge globally by credential priority
    pub fn select(
        snapshot: &CatalogSnapshot,
        model: Option<&str>,
        settings: &RotationSettings,
    ) -> Vec<Candidate> {
        let mut providers: Vec<&Provider> = snapshot
            .providers
            .iter()
            .filter(|p| p.active)
            .filter(|p| model.is_none_or(|m| p.supports_model(m)))
            .collect();
        providers.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

        // without fallback the top provider is the only one, even if it has
        // no usable credential
        if !settings.fallback_enabled {
            providers.truncate(1);
        }

        let mut candidates: Vec<Candidate> = providers
            .into_iter()
            .flat_map(|provider| Self::provider_group(provider, &snapshot.credentials, model))
            .collect();

        if settings.strategy == RotationStrategy::Global {
            // stable: equal priorities keep provider order
            candidates.sort_by_key(|c| Reverse(c.credential.priority));
        }

        candidates
    }

    fn provider_group(
        provider: &Provider,
        credentials: &[Credential],
        model: Option<&str>,
    ) -> Vec<Candidate> {
        let mut eligible: Vec<&Credential> = credentials
            .iter()
            .filter(|c| c.provider_id == provider.id && c.active && c.serves_model(model))
            .collect();
        eligible.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

        eligible
            .into_iter()
            .map(|credential| Candidate {
                provider: provider.clone(),
                credential: credential.clone(),
            })
            .collect()
    }
}
