//! Authentication middleware
//!
//! Rejects `/v1` requests whose bearer key is not one of the configured
//! caller keys. Does nothing while auth is disabled.

use crate::server::AppState;
use crate::server::middleware::helpers::extract_bearer_token;
use crate::utils::error::GatewayError;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::web;
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// Auth middleware for Actix-web
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

/// Service implementation for auth middleware
pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verdict = match req.app_data::<web::Data<AppState>>() {
            None => Err(GatewayError::internal("application state missing")),
            Some(state) => {
                let auth = state.config.auth();
                match extract_bearer_token(req.headers()) {
                    _ if !auth.enabled => Ok(()),
                    Some(token) if auth.accepts(token) => Ok(()),
                    Some(_) => Err(GatewayError::unauthorized("invalid API key")),
                    None => Err(GatewayError::unauthorized("missing bearer token")),
                }
            }
        };

        match verdict {
            Ok(()) => {
                debug!(path = %req.path(), "Caller accepted");
                Box::pin(self.service.call(req))
            }
            Err(e) => {
                warn!(path = %req.path(), "Rejected caller: {}", e);
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}
