//! HTTP surface tests
//!
//! The full app (auth, routes, router, in-memory store) driven through
//! `actix_web::test` with vendors mocked by `wiremock`.

use crate::common::upstream::{error_body, mount_openai, openai_body};
use crate::common::{CatalogBuilder, credential, provider};
use actix_web::{App, http::StatusCode, test, web};
use keyrelay::config::Config;
use keyrelay::core::models::VendorKind;
use keyrelay::core::router::ReqwestTransport;
use keyrelay::server::{HttpServer, configure_app};
use keyrelay::storage::{MemoryStore, StorageLayer};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::MockServer;

const CALLER_KEY: &str = "caller-secret";

async fn gateway(upstream: &MockServer, store: Arc<MemoryStore>) -> HttpServer {
    CatalogBuilder::new()
        .provider(provider(
            "openai",
            VendorKind::OpenaiCompatible,
            &format!("{}/v1", upstream.uri()),
            10,
            &["gpt-4o-mini"],
        ))
        .credential(credential("k1", "openai", "sk-first", 20))
        .credential(credential("k2", "openai", "sk-second", 10))
        .write_to(store.as_ref())
        .await;

    let mut config = Config::default();
    config.gateway.auth.enabled = true;
    config.gateway.auth.api_keys = vec![CALLER_KEY.to_string()];

    HttpServer::with_transport(
        config,
        StorageLayer::from_shared(store),
        Arc::new(ReqwestTransport::new().unwrap()),
    )
}

fn chat_request() -> test::TestRequest {
    test::TestRequest::post()
        .uri("/v1/chat/completions")
        .insert_header(("Authorization", format!("Bearer {}", CALLER_KEY)))
        .set_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": "hi" }]
        }))
}

#[actix_web::test]
async fn test_chat_completion_fails_over() {
    let upstream = MockServer::start().await;
    mount_openai(&upstream, "sk-first", 500, error_body(500, "upstream exploded")).await;
    mount_openai(&upstream, "sk-second", 200, openai_body("served by second")).await;

    let store = Arc::new(MemoryStore::new());
    let server = gateway(&upstream, store.clone()).await;
    let state = web::Data::new(server.state().clone());
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, state))).await;

    let resp = test::call_service(&app, chat_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["choices"][0]["message"]["content"], "served by second");
    assert_eq!(body["choices"][0]["finish_reason"], "stop");

    assert_eq!(store.credential("k1").unwrap().priority, 19);
    assert_eq!(store.credential("k2").unwrap().total_requests, 1);
}

#[actix_web::test]
async fn test_exhausted_returns_502_report() {
    let upstream = MockServer::start().await;
    mount_openai(&upstream, "sk-first", 429, error_body(429, "Rate limit reached")).await;
    mount_openai(&upstream, "sk-second", 401, error_body(401, "Incorrect API key")).await;

    let store = Arc::new(MemoryStore::new());
    let server = gateway(&upstream, store.clone()).await;
    let state = web::Data::new(server.state().clone());
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, state))).await;

    let resp = test::call_service(&app, chat_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "all providers failed to process the request");
    assert_eq!(body["last_error"], "Incorrect API key");
    assert_eq!(body["details"][0]["status"], 429);
    assert_eq!(body["details"][1]["status"], 401);
    assert_eq!(body["details"][1]["provider"], "openai");

    // both demoted by the severe step
    assert_eq!(store.credential("k1").unwrap().priority, 10);
    assert_eq!(store.credential("k2").unwrap().priority, 0);
}

#[actix_web::test]
async fn test_missing_caller_key_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let server = gateway(&upstream, store.clone()).await;
    let state = web::Data::new(server.state().clone());
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, state))).await;

    let req = test::TestRequest::post()
        .uri("/v1/chat/completions")
        .set_json(json!({ "model": "gpt-4o-mini", "messages": [{ "role": "user", "content": "hi" }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(upstream.received_requests().await.unwrap().is_empty());
    assert!(store.usage_logs().is_empty());
}

#[actix_web::test]
async fn test_credential_probe_endpoint() {
    let upstream = MockServer::start().await;
    mount_openai(&upstream, "sk-second", 429, error_body(429, "You exceeded your current quota")).await;

    let store = Arc::new(MemoryStore::new());
    let server = gateway(&upstream, store.clone()).await;
    let state = web::Data::new(server.state().clone());
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, state))).await;

    let req = test::TestRequest::post()
        .uri("/v1/credentials/k2/test")
        .insert_header(("Authorization", format!("Bearer {}", CALLER_KEY)))
        .set_json(json!({ "message": "ping" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "quota_exceeded");
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["error"], "You exceeded your current quota");

    let k2 = store.credential("k2").unwrap();
    assert_eq!(k2.priority, 10);
    assert_eq!(k2.failed_requests, 1);

    let sent = upstream.received_requests().await.unwrap();
    let sent_body: Value = serde_json::from_slice(&sent[0].body).unwrap();
    assert_eq!(sent_body["messages"][0]["content"], "ping");
}
