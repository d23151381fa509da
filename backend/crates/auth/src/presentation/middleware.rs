//! Auth Middleware
//!
//! Middleware for requiring a resolved session on protected routes.
//! Resolution runs exactly once per request; anything short of an
//! eligible account is a deny, never a retry or a default-allow.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::ResolveSessionUseCase;
use crate::application::config::AuthConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountStore;

/// Middleware state
#[derive(Clone)]
pub struct SessionMiddlewareState<R>
where
    R: AccountStore + Clone + Send + Sync + 'static,
{
    pub store: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// The resolved account, stored in request extensions for handlers
#[derive(Clone)]
pub struct CurrentAccount(pub Account);

/// Middleware that requires a valid member session
pub async fn require_session<R>(
    state: SessionMiddlewareState<R>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: AccountStore + Clone + Send + Sync + 'static,
{
    let use_case = ResolveSessionUseCase::new(state.store.clone(), state.config.clone());

    match use_case.resolve_user(req.headers()).await {
        Ok(session) => {
            req.extensions_mut().insert(CurrentAccount(session.account));
            Ok(next.run(req).await)
        }
        Err(_) => Err((StatusCode::UNAUTHORIZED, [("X-Auth-Required", "true")]).into_response()),
    }
}

/// Middleware that requires a valid administrator session
pub async fn require_admin_session<R>(
    state: SessionMiddlewareState<R>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: AccountStore + Clone + Send + Sync + 'static,
{
    let use_case = ResolveSessionUseCase::new(state.store.clone(), state.config.clone());

    match use_case.resolve_admin(req.headers()).await {
        Ok(session) => {
            req.extensions_mut().insert(CurrentAccount(session.account));
            Ok(next.run(req).await)
        }
        Err(_) => Err((StatusCode::UNAUTHORIZED, [("X-Auth-Required", "true")]).into_response()),
    }
}
