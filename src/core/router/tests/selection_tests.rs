//! Candidate selection tests

use super::{credential, provider};
use crate::core::models::{CatalogSnapshot, RotationSettings, RotationStrategy};
use crate::core::router::selection::CandidateSelector;

fn ids(candidates: &[crate::core::models::Candidate]) -> Vec<String> {
    candidates.iter().map(|c| c.credential.id.clone()).collect()
}

fn two_provider_snapshot() -> CatalogSnapshot {
    CatalogSnapshot {
        providers: vec![
            provider("openai", 90, &["gpt-4o", "shared"]),
            provider("google", 100, &["gemini", "shared"]),
        ],
        credentials: vec![
            credential("g1", "google", 5),
            credential("g2", "google", 50),
            credential("o1", "openai", 80),
            credential("o2", "openai", 1),
        ],
    }
}

#[test]
fn test_per_provider_never_interleaves() {
    let snapshot = two_provider_snapshot();
    let candidates =
        CandidateSelector::select(&snapshot, Some("shared"), &RotationSettings::default());

    assert_eq!(ids(&candidates), vec!["g2", "g1", "o1", "o2"]);
}

#[test]
fn test_global_sorts_by_credential_priority() {
    let snapshot = two_provider_snapshot();
    let settings = RotationSettings {
        strategy: RotationStrategy::Global,
        fallback_enabled: true,
    };
    let candidates = CandidateSelector::select(&snapshot, Some("shared"), &settings);

    assert_eq!(ids(&candidates), vec!["o1", "g2", "g1", "o2"]);
}

#[test]
fn test_global_sort_is_stable_on_ties() {
    let snapshot = CatalogSnapshot {
        providers: vec![provider("a", 10, &["m"]), provider("b", 20, &["m"])],
        credentials: vec![
            credential("a1", "a", 7),
            credential("b1", "b", 7),
            credential("b2", "b", 7),
        ],
    };
    let settings = RotationSettings {
        strategy: RotationStrategy::Global,
        fallback_enabled: true,
    };

    let candidates = CandidateSelector::select(&snapshot, Some("m"), &settings);
    assert_eq!(ids(&candidates), vec!["b1", "b2", "a1"]);
}

#[test]
fn test_fallback_disabled_keeps_first_provider() {
    let snapshot = two_provider_snapshot();
    let settings = RotationSettings {
        strategy: RotationStrategy::PerProvider,
        fallback_enabled: false,
    };

    let candidates = CandidateSelector::select(&snapshot, Some("shared"), &settings);
    assert!(candidates.iter().all(|c| c.provider.id == "google"));
    assert_eq!(candidates.len(), 2);
}

#[test]
fn test_fallback_disabled_with_unusable_top_provider_selects_nothing() {
    let mut snapshot = two_provider_snapshot();
    for credential in snapshot.credentials.iter_mut() {
        if credential.provider_id == "google" {
            credential.active = false;
        }
    }
    let settings = RotationSettings {
        strategy: RotationStrategy::PerProvider,
        fallback_enabled: false,
    };

    let candidates = CandidateSelector::select(&snapshot, Some("shared"), &settings);
    assert!(candidates.is_empty());

    let with_fallback = RotationSettings {
        fallback_enabled: true,
        ..settings
    };
    let candidates = CandidateSelector::select(&snapshot, Some("shared"), &with_fallback);
    assert_eq!(ids(&candidates), vec!["o1", "o2"]);
}

#[test]
fn test_model_filter() {
    let snapshot = two_provider_snapshot();
    let candidates =
        CandidateSelector::select(&snapshot, Some("gpt-4o"), &RotationSettings::default());
    assert_eq!(ids(&candidates), vec!["o1", "o2"]);

    let none = CandidateSelector::select(&snapshot, Some("unknown"), &RotationSettings::default());
    assert!(none.is_empty());
}

#[test]
fn test_no_model_matches_every_provider() {
    let snapshot = two_provider_snapshot();
    let candidates = CandidateSelector::select(&snapshot, None, &RotationSettings::default());
    assert_eq!(candidates.len(), 4);
}

#[test]
fn test_inactive_entries_are_skipped() {
    let mut snapshot = two_provider_snapshot();
    snapshot.providers[1].active = false; // google
    snapshot.credentials[2].active = false; // o1

    let candidates =
        CandidateSelector::select(&snapshot, Some("shared"), &RotationSettings::default());
    assert_eq!(ids(&candidates), vec!["o2"]);
}

#[test]
fn test_credential_model_restriction() {
    let mut snapshot = two_provider_snapshot();
    snapshot.credentials[1].model = Some("gemini".to_string()); // g2

    let shared =
        CandidateSelector::select(&snapshot, Some("shared"), &RotationSettings::default());
    assert!(!ids(&shared).contains(&"g2".to_string()));

    let gemini =
        CandidateSelector::select(&snapshot, Some("gemini"), &RotationSettings::default());
    assert_eq!(ids(&gemini), vec!["g2", "g1"]);
}

#[test]
fn test_equal_priorities_order_by_id() {
    let snapshot = CatalogSnapshot {
        providers: vec![provider("zeta", 1, &["m"]), provider("alpha", 1, &["m"])],
        credentials: vec![
            credential("z2", "zeta", 3),
            credential("z1", "zeta", 3),
            credential("a1", "alpha", 3),
        ],
    };

    let candidates = CandidateSelector::select(&snapshot, Some("m"), &RotationSettings::default());
    assert_eq!(ids(&candidates), vec!["a1", "z1", "z2"]);
}

#[test]
fn test_empty_catalog() {
    let candidates = CandidateSelector::select(
        &CatalogSnapshot::default(),
        Some("m"),
        &RotationSettings::default(),
    );
    assert!(candidates.is_empty());
}
