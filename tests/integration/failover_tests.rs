//! Failover through real HTTP against mocked vendors

use crate::common::upstream::{
    OPENAI_PATH, anthropic_body, error_body, gemini_body, mount_anthropic, mount_gemini,
    mount_openai, openai_body,
};
use crate::common::{CatalogBuilder, credential, provider};
use keyrelay::config::RouterConfig;
use keyrelay::core::models::{RotationSettings, RotationStrategy, VendorKind};
use keyrelay::core::router::{
    ALL_FAILED, ALL_RATE_LIMITED, FailoverExecutor, ReqwestTransport, RoutingError,
};
use keyrelay::core::types::{ChatMessage, ChatRequest};
use keyrelay::services::NoopEventSink;
use keyrelay::storage::{CatalogStore, MemoryStore, StorageLayer};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "shared-model";

fn executor(store: &Arc<MemoryStore>, config: &RouterConfig) -> FailoverExecutor {
    FailoverExecutor::new(
        &StorageLayer::from_shared(store.clone()),
        Arc::new(NoopEventSink),
        Arc::new(ReqwestTransport::new().unwrap()),
        config,
    )
}

fn request() -> ChatRequest {
    ChatRequest::new(MODEL, vec![ChatMessage::user("hello")])
}

#[tokio::test]
async fn test_google_429_fails_over_to_openai() {
    let google = MockServer::start().await;
    let openai = MockServer::start().await;
    mount_gemini(&google, MODEL, "g-key", 429, error_body(429, "Resource has been exhausted")).await;
    mount_openai(&openai, "o-key", 200, openai_body("hello from openai")).await;

    let store = Arc::new(MemoryStore::new());
    CatalogBuilder::new()
        .provider(provider(
            "google",
            VendorKind::Google,
            &format!("{}/v1beta", google.uri()),
            100,
            &[MODEL],
        ))
        .provider(provider(
            "openai",
            VendorKind::OpenaiCompatible,
            &format!("{}/v1", openai.uri()),
            90,
            &[MODEL],
        ))
        .credential(credential("g1", "google", "g-key", 50))
        .credential(credential("o1", "openai", "o-key", 50))
        .write_to(store.as_ref())
        .await;

    let response = executor(&store, &RouterConfig::default())
        .execute(&request())
        .await
        .unwrap();

    assert_eq!(response.model, MODEL);
    assert_eq!(response.content(), Some("hello from openai"));
    assert_eq!(response.choices[0].finish_reason, "stop");
    assert_eq!(response.usage.total_tokens, 11);

    let g1 = store.credential("g1").unwrap();
    assert_eq!(g1.priority, 40);
    assert_eq!(g1.failed_requests, 1);
    assert_eq!(g1.last_error.as_deref(), Some("Resource has been exhausted"));

    let o1 = store.credential("o1").unwrap();
    assert_eq!(o1.total_requests, 1);
    assert_eq!(o1.priority, 50);

    assert_eq!(google.received_requests().await.unwrap().len(), 1);
    assert_eq!(openai.received_requests().await.unwrap().len(), 1);
    assert_eq!(store.usage_logs().len(), 2);
}

#[tokio::test]
async fn test_gemini_and_anthropic_round_trip() {
    let google = MockServer::start().await;
    let anthropic = MockServer::start().await;
    mount_gemini(&google, MODEL, "g-key", 200, gemini_body("from gemini")).await;
    mount_anthropic(&anthropic, "a-key", 200, anthropic_body("from claude")).await;

    let store = Arc::new(MemoryStore::new());
    CatalogBuilder::new()
        .provider(provider(
            "google",
            VendorKind::Google,
            &format!("{}/v1beta", google.uri()),
            10,
            &[MODEL],
        ))
        .provider(provider(
            "anthropic",
            VendorKind::Anthropic,
            &format!("{}/v1", anthropic.uri()),
            20,
            &[MODEL],
        ))
        .credential(credential("g1", "google", "g-key", 1))
        .credential(credential("a1", "anthropic", "a-key", 1))
        .write_to(store.as_ref())
        .await;

    let response = executor(&store, &RouterConfig::default())
        .execute(&request())
        .await
        .unwrap();
    assert_eq!(response.content(), Some("from claude"));
    assert_eq!(response.usage.total_tokens, 8);

    let mut a1 = store.credential("a1").unwrap();
    a1.active = false;
    store.insert_credential(&a1).await.unwrap();
    let response = executor(&store, &RouterConfig::default())
        .execute(&request())
        .await
        .unwrap();
    assert_eq!(response.content(), Some("from gemini"));
    assert_eq!(response.usage.total_tokens, 8);
}

#[tokio::test]
async fn test_all_credentials_rate_limited() {
    let openai = MockServer::start().await;
    mount_openai(&openai, "k1", 429, error_body(429, "Rate limit reached")).await;
    mount_openai(&openai, "k2", 429, error_body(429, "Rate limit reached")).await;

    let store = Arc::new(MemoryStore::new());
    CatalogBuilder::new()
        .provider(provider(
            "openai",
            VendorKind::OpenaiCompatible,
            &format!("{}/v1", openai.uri()),
            10,
            &[MODEL],
        ))
        .credential(credential("c1", "openai", "k1", 30))
        .credential(credential("c2", "openai", "k2", 20))
        .write_to(store.as_ref())
        .await;

    let err = executor(&store, &RouterConfig::default())
        .execute(&request())
        .await
        .unwrap_err();

    match err {
        RoutingError::Exhausted(report) => {
            assert_eq!(report.error, ALL_RATE_LIMITED);
            assert_eq!(report.details.len(), 2);
            assert_eq!(report.details[0].key, "c1-name");
            assert!(report.details.iter().all(|d| d.status == 429));
        }
        other => panic!("unexpected error {:?}", other),
    }

    assert_eq!(store.credential("c1").unwrap().priority, 20);
    assert_eq!(store.credential("c2").unwrap().priority, 10);
}

#[tokio::test]
async fn test_timeout_and_server_error_are_mixed_failures() {
    let slow = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_body("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&slow)
        .await;
    let broken = MockServer::start().await;
    mount_openai(&broken, "b-key", 503, error_body(503, "overloaded")).await;

    let store = Arc::new(MemoryStore::new());
    CatalogBuilder::new()
        .provider(provider(
            "slow",
            VendorKind::OpenaiCompatible,
            &format!("{}/v1", slow.uri()),
            20,
            &[MODEL],
        ))
        .provider(provider(
            "broken",
            VendorKind::OpenaiCompatible,
            &format!("{}/v1", broken.uri()),
            10,
            &[MODEL],
        ))
        .credential(credential("s1", "slow", "s-key", 5))
        .credential(credential("b1", "broken", "b-key", 5))
        .write_to(store.as_ref())
        .await;

    let config = RouterConfig {
        request_timeout_secs: 1,
        ..RouterConfig::default()
    };
    let err = executor(&store, &config)
        .execute(&request())
        .await
        .unwrap_err();

    match err {
        RoutingError::Exhausted(report) => {
            assert_eq!(report.error, ALL_FAILED);
            let statuses: Vec<u16> = report.details.iter().map(|d| d.status).collect();
            assert_eq!(statuses, vec![504, 503]);
            assert_eq!(report.last_error.as_deref(), Some("overloaded"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_fallback_disabled_stays_on_first_provider() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_openai(&first, "f-key", 500, error_body(500, "boom")).await;
    mount_openai(&second, "s-key", 200, openai_body("never reached")).await;

    let store = Arc::new(MemoryStore::new());
    CatalogBuilder::new()
        .rotation(RotationSettings {
            strategy: RotationStrategy::PerProvider,
            fallback_enabled: false,
        })
        .provider(provider(
            "first",
            VendorKind::OpenaiCompatible,
            &format!("{}/v1", first.uri()),
            20,
            &[MODEL],
        ))
        .provider(provider(
            "second",
            VendorKind::OpenaiCompatible,
            &format!("{}/v1", second.uri()),
            10,
            &[MODEL],
        ))
        .credential(credential("f1", "first", "f-key", 5))
        .credential(credential("s1", "second", "s-key", 5))
        .write_to(store.as_ref())
        .await;

    let err = executor(&store, &RouterConfig::default())
        .execute(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, RoutingError::Exhausted(_)));
    assert!(second.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_upstream_reports_500() {
    // port 1 is never served in test environments
    let uri = "http://127.0.0.1:1";

    let store = Arc::new(MemoryStore::new());
    CatalogBuilder::new()
        .provider(provider(
            "gone",
            VendorKind::OpenaiCompatible,
            &format!("{}/v1", uri),
            1,
            &[MODEL],
        ))
        .credential(credential("g1", "gone", "key", 1))
        .write_to(store.as_ref())
        .await;

    let err = executor(&store, &RouterConfig::default())
        .execute(&request())
        .await
        .unwrap_err();

    match err {
        RoutingError::Exhausted(report) => assert_eq!(report.details[0].status, 500),
        other => panic!("unexpected error {:?}", other),
    }
}
