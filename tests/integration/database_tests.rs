//! Database integration tests
//!
//! Storage operations against a real in-memory SQLite database.

use crate::common::{CatalogBuilder, TestDatabase, credential, provider};
use chrono::Utc;
use keyrelay::config::ProviderConfig;
use keyrelay::core::models::{
    AttemptStatus, RotationSettings, RotationStrategy, UsageLogEntry, VendorKind,
};
use keyrelay::storage::{
    CatalogStore, HealthStore, PriorityDecay, StorageLayer, UsageLogSink, seed_catalog,
};
use sea_orm::ConnectionTrait;

async fn seeded_db() -> TestDatabase {
    let db = TestDatabase::new().await;
    CatalogBuilder::new()
        .provider(provider(
            "openai",
            VendorKind::OpenaiCompatible,
            "https://api.openai.com/v1",
            90,
            &["gpt-4o", "gpt-4o-mini"],
        ))
        .provider(provider(
            "google",
            VendorKind::Google,
            "https://generativelanguage.googleapis.com/v1beta",
            100,
            &["gemini-2.5-flash"],
        ))
        .credential(credential("o1", "openai", "sk-1", 5))
        .credential(credential("o2", "openai", "sk-2", 0))
        .credential(credential("g1", "google", "AIza-1", 50))
        .write_to(db.db())
        .await;
    db
}

#[tokio::test]
async fn test_database_health_check() {
    let db = TestDatabase::new().await;
    assert!(db.db().health_check().await.is_ok());
    assert!(db.db().is_empty().await.unwrap());
}

#[tokio::test]
async fn test_snapshot_round_trip() {
    let db = seeded_db().await;
    let snapshot = db.db().snapshot().await.unwrap();

    let provider_ids: Vec<&str> = snapshot.providers.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(provider_ids, vec!["google", "openai"]);
    assert_eq!(snapshot.providers[1].models, vec!["gpt-4o", "gpt-4o-mini"]);
    assert_eq!(snapshot.providers[0].vendor_kind, VendorKind::Google);
    assert_eq!(snapshot.credentials.len(), 3);

    let o1 = db.db().find_credential("o1").await.unwrap().unwrap();
    assert_eq!(o1.api_key, "sk-1");
    assert_eq!(o1.name.as_deref(), Some("o1-name"));
    assert!(db.db().find_credential("nope").await.unwrap().is_none());

    let google = db.db().find_provider("google").await.unwrap().unwrap();
    assert_eq!(google.models, vec!["gemini-2.5-flash"]);
}

#[tokio::test]
async fn test_rotation_settings_upsert() {
    let db = TestDatabase::new().await;
    assert_eq!(
        db.db().rotation_settings().await.unwrap(),
        RotationSettings::default()
    );

    let global = RotationSettings {
        strategy: RotationStrategy::Global,
        fallback_enabled: false,
    };
    db.db().save_rotation_settings(&global).await.unwrap();
    db.db().save_rotation_settings(&global).await.unwrap();
    assert_eq!(db.db().rotation_settings().await.unwrap(), global);
}

#[tokio::test]
async fn test_failure_and_success_writes() {
    let db = seeded_db().await;

    let failed = db
        .db()
        .record_failure("o1", "rate limited", Some(PriorityDecay::new(10, 0)), Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(failed.priority, 0);
    assert_eq!(failed.failed_requests, 1);
    assert_eq!(failed.total_requests, 0);
    assert_eq!(failed.last_error.as_deref(), Some("rate limited"));
    assert!(failed.last_used_at.is_some());

    let ok = db.db().record_success("o1", Utc::now()).await.unwrap().unwrap();
    assert_eq!(ok.total_requests, 1);
    assert_eq!(ok.failed_requests, 1);
    assert_eq!(ok.priority, 0);
    assert!(ok.last_error.is_none());

    assert!(
        db.db()
            .record_success("missing", Utc::now())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_decay_never_raises_priority() {
    let db = TestDatabase::new().await;
    CatalogBuilder::new()
        .provider(provider("p", VendorKind::OpenaiCompatible, "http://p", 1, &["m"]))
        .credential(credential("neg", "p", "k", -4))
        .write_to(db.db())
        .await;

    let updated = db
        .db()
        .record_failure("neg", "x", Some(PriorityDecay::new(1, 0)), Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.priority, -4);
    assert_eq!(updated.failed_requests, 1);
}

#[tokio::test]
async fn test_provider_cascade() {
    let db = seeded_db().await;
    let decay = PriorityDecay::new(1, 0);

    // o1 is still above the floor
    assert!(
        db.db()
            .decay_provider_if_exhausted("openai", 0, decay)
            .await
            .unwrap()
            .is_none()
    );

    db.db().set_credential_priority("o1", 0).await.unwrap();
    let demoted = db
        .db()
        .decay_provider_if_exhausted("openai", 0, decay)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(demoted.priority, 89);
    assert_eq!(demoted.models.len(), 2);

    // google untouched
    let google = db.db().find_provider("google").await.unwrap().unwrap();
    assert_eq!(google.priority, 100);
}

#[tokio::test]
async fn test_concurrent_failures_are_counted() {
    let db = seeded_db().await;
    let shared = db.db_arc();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let db = shared.clone();
        handles.push(tokio::spawn(async move {
            db.record_failure("g1", "boom", Some(PriorityDecay::new(1, 0)), Utc::now())
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let g1 = shared.find_credential("g1").await.unwrap().unwrap();
    assert_eq!(g1.failed_requests, 20);
    assert_eq!(g1.priority, 30);
}

#[tokio::test]
async fn test_usage_log_append() {
    let db = seeded_db().await;

    let ok = UsageLogEntry::new("openai", "o1", "gpt-4o", "/v1/chat/completions")
        .succeeded(200, 120, 42);
    let failed = UsageLogEntry::new("google", "g1", "gemini-2.5-flash", "/v1/chat/completions")
        .failed(429, 80, "quota");
    db.db().append(&ok).await.unwrap();
    db.db().append(&failed).await.unwrap();

    let logs = db.db().recent_usage_logs(10).await.unwrap();
    assert_eq!(logs.len(), 2);

    let stored_ok = logs.iter().find(|l| l.id == ok.id).unwrap();
    assert_eq!(stored_ok.status, AttemptStatus::Success);
    assert_eq!(stored_ok.tokens_used, Some(42));
    assert_eq!(stored_ok.latency_ms, 120);

    let stored_failed = logs.iter().find(|l| l.id == failed.id).unwrap();
    assert_eq!(stored_failed.status, AttemptStatus::Error);
    assert_eq!(stored_failed.status_code, Some(429));
    assert_eq!(stored_failed.error_message.as_deref(), Some("quota"));
}

#[tokio::test]
async fn test_seed_catalog_into_database() {
    let db = TestDatabase::new().await;
    let providers: Vec<ProviderConfig> = serde_yaml::from_str(
        r#"
- id: anthropic
  name: Anthropic
  base_url: https://api.anthropic.com/v1
  vendor_kind: anthropic
  priority: 80
  models: [claude-sonnet-4]
  credentials:
    - id: a1
      api_key: sk-ant-1
      priority: 10
    - id: a2
      api_key: sk-ant-2
"#,
    )
    .unwrap();
    let rotation = RotationSettings {
        strategy: RotationStrategy::Global,
        fallback_enabled: true,
    };

    let storage = StorageLayer::from_shared(db.db_arc());
    assert_eq!(
        seed_catalog(storage.catalog.as_ref(), &providers, &rotation)
            .await
            .unwrap(),
        1
    );
    // second run leaves the populated store alone
    assert_eq!(
        seed_catalog(storage.catalog.as_ref(), &providers, &rotation)
            .await
            .unwrap(),
        0
    );

    let snapshot = db.db().snapshot().await.unwrap();
    assert_eq!(snapshot.providers.len(), 1);
    assert_eq!(snapshot.providers[0].vendor_kind, VendorKind::Anthropic);
    assert_eq!(snapshot.credentials.len(), 2);
    assert_eq!(db.db().rotation_settings().await.unwrap(), rotation);
}

#[tokio::test]
async fn test_unknown_vendor_kind_is_never_routed() {
    let db = seeded_db().await;
    db.db()
        .connection()
        .execute_unprepared("UPDATE providers SET vendor_kind = 'claude' WHERE id = 'google'")
        .await
        .unwrap();

    let snapshot = db.db().snapshot().await.unwrap();
    let provider_ids: Vec<&str> = snapshot.providers.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(provider_ids, vec!["openai"]);
    assert!(
        snapshot
            .providers
            .iter()
            .all(|p| p.vendor_kind == VendorKind::OpenaiCompatible && p.id == "openai")
    );

    let err = db.db().find_provider("google").await.unwrap_err();
    assert!(err.to_string().contains("claude"));
    assert!(db.db().find_provider("openai").await.unwrap().is_some());
}

#[tokio::test]
async fn test_catalog_insert_rolls_back_as_a_unit() {
    let db = TestDatabase::new().await;
    let first = provider("openai", VendorKind::OpenaiCompatible, "https://api.openai.com/v1", 90, &["gpt-4o"]);
    let second = provider("groq", VendorKind::OpenaiCompatible, "https://api.groq.com/openai/v1", 80, &["llama"]);
    // duplicate credential id fails the last insert
    let entries = vec![
        (first, vec![credential("k1", "openai", "sk-1", 5)]),
        (second, vec![credential("k1", "groq", "gsk-1", 5)]),
    ];
    let rotation = RotationSettings {
        strategy: RotationStrategy::Global,
        fallback_enabled: false,
    };

    assert!(db.db().insert_catalog(&rotation, &entries).await.is_err());
    assert!(db.db().is_empty().await.unwrap());
    assert!(db.db().find_credential("k1").await.unwrap().is_none());
    assert_eq!(db.db().rotation_settings().await.unwrap(), RotationSettings::default());
}
