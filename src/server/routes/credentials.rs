//! Credential probe endpoint

use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Deserialize;
use tracing::info;

/// Optional probe parameters
#[derive(Debug, Default, Deserialize)]
pub struct ProbeRequest {
    pub model: Option<String>,
    pub message: Option<String>,
}

/// Send a test message through one credential
pub async fn test_credential(
    state: web::Data<AppState>,
    credential_id: web::Path<String>,
    body: Option<web::Json<ProbeRequest>>,
) -> ActixResult<HttpResponse> {
    let credential_id = credential_id.into_inner();
    let params = body.map(web::Json::into_inner).unwrap_or_default();

    let report = state
        .executor
        .probe(
            &credential_id,
            params.model.as_deref(),
            params.message.as_deref(),
        )
        .await?;

    info!(
        credential = %credential_id,
        success = report.success,
        latency_ms = report.latency_ms,
        "Credential probe finished"
    );
    Ok(HttpResponse::Ok().json(report))
}
