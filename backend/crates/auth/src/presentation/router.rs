//! Auth Routers

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{AccountStore, MailDispatcher, OtpStore, ThrottleStore};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{
    SessionMiddlewareState, require_admin_session, require_session,
};

/// Member-facing auth routes, mounted under `/api/auth`
pub fn auth_router<R, M>(store: Arc<R>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Router
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        store: store.clone(),
        mailer,
        config: config.clone(),
    };
    let mw_state = SessionMiddlewareState { store, config };

    let protected = Router::new()
        .route("/password", post(handlers::change_password::<R, M>))
        .route_layer(axum::middleware::from_fn(move |req, next| {
            let mw_state = mw_state.clone();
            async move { require_session(mw_state, req, next).await }
        }));

    Router::new()
        .route("/login", post(handlers::login::<R, M>))
        .route("/logout", post(handlers::logout::<R, M>))
        .route("/session", get(handlers::session_status::<R, M>))
        .merge(protected)
        .with_state(state)
}

/// Administrator auth routes, mounted under `/api/admin`
pub fn admin_router<R, M>(store: Arc<R>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Router
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        store: store.clone(),
        mailer,
        config: config.clone(),
    };
    let mw_state = SessionMiddlewareState { store, config };

    let protected = Router::new()
        .route("/accounts", post(handlers::provision_account::<R, M>))
        .route_layer(axum::middleware::from_fn(move |req, next| {
            let mw_state = mw_state.clone();
            async move { require_admin_session(mw_state, req, next).await }
        }));

    Router::new()
        .route("/login", post(handlers::admin_login::<R, M>))
        .route("/verify-otp", post(handlers::admin_verify::<R, M>))
        .route("/logout", post(handlers::admin_logout::<R, M>))
        .route("/session", get(handlers::admin_session_status::<R, M>))
        .merge(protected)
        .with_state(state)
}
