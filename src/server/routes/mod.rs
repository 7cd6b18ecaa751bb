//! HTTP route modules
//!
//! `/health` is public; everything under `/v1` sits behind the auth
//! middleware.

pub mod chat;
pub mod credentials;
pub mod health;
pub mod models;

use actix_web::web;

/// Configure the `/v1` routes (mounted inside the `/v1` scope)
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/chat/completions", web::post().to(chat::chat_completions))
        .route("/models", web::get().to(models::list_models))
        .route(
            "/credentials/{credential_id}/test",
            web::post().to(credentials::test_credential),
        );
}
