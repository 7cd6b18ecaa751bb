//! Chat completions endpoint

use crate::core::types::ChatRequest;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{HttpResponse, Result as ActixResult, web};
use tracing::{debug, info};

/// Chat completions endpoint
///
/// Validates the body, then hands it to the failover router. Routing
/// failures map to 503 (no candidate) or 502 (every candidate failed).
pub async fn chat_completions(
    state: web::Data<AppState>,
    request: web::Json<ChatRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();
    request.validate().map_err(GatewayError::Validation)?;

    debug!(
        model = request.requested_model().unwrap_or("*"),
        messages = request.messages.len(),
        "Chat completion requested"
    );

    let response = state.executor.execute(&request).await?;

    info!(model = %response.model, tokens = response.usage.total_tokens, "Chat completion served");
    Ok(HttpResponse::Ok().json(response))
}
