//! HTTP Handlers

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

use platform::client::{client_origin, extract_client_ip};
use platform::cookie::set_cookie_header;

use crate::application::config::AuthConfig;
use crate::application::{
    AdminLoginInput, AdminLoginUseCase, AdminVerifyInput, ChangePasswordInput,
    ChangePasswordUseCase, LoginInput, LoginUseCase, ProvisionAccountInput,
    ProvisionAccountUseCase, ResolveSessionUseCase,
};
use crate::domain::repository::{AccountStore, MailDispatcher, OtpStore, ThrottleStore};
use crate::domain::value_object::account_role::AccountRole;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AdminLoginRequest, AdminLoginResponse, AdminVerifyRequest, AdminVerifyResponse,
    ChangePasswordRequest, LoginRequest, LoginResponse, ProvisionAccountRequest,
    ProvisionAccountResponse, SessionStatusResponse,
};
use crate::presentation::middleware::CurrentAccount;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, M>
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    pub store: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
}

fn request_origin(headers: &HeaderMap, addr: std::net::SocketAddr) -> String {
    client_origin(extract_client_ip(headers, Some(addr.ip())))
}

// ============================================================================
// Member Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let origin = request_origin(&headers, addr);

    let use_case = LoginUseCase::new(state.store.clone(), state.store.clone(), state.config.clone());

    let input = LoginInput {
        email: req.email,
        password: req.password,
    };
    let output = use_case.execute(input, &origin).await?;

    let cookie = set_cookie_header(&state.config.user_cookie(), &output.session_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            account_id: output.account.account_id.to_string(),
            name: output.account.name,
        }),
    ))
}

/// POST /api/auth/logout
///
/// Sessions are stateless; logout is purely expiring the cookie.
pub async fn logout<R, M>(
    State(state): State<AuthAppState<R, M>>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let cookie = state.config.user_cookie().build_delete_cookie();
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

/// GET /api/auth/session
pub async fn session_status<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<Json<SessionStatusResponse>>
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let use_case = ResolveSessionUseCase::new(state.store.clone(), state.config.clone());

    match use_case.resolve_user(&headers).await {
        Ok(session) => Ok(Json(SessionStatusResponse {
            authenticated: true,
            account_id: Some(session.account.account_id.to_string()),
            email: Some(session.account.email.to_string()),
            name: Some(session.account.name),
            role: Some(session.account.role.code().to_string()),
            expires_at: Some(session.expires_at),
        })),
        Err(_) => Ok(Json(SessionStatusResponse::unauthenticated())),
    }
}

/// POST /api/auth/password (behind `require_session`)
pub async fn change_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<StatusCode>
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let use_case = ChangePasswordUseCase::new(state.store.clone());
    use_case
        .execute(
            &account,
            ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Administrator Login (two-step)
// ============================================================================

/// POST /api/admin/login
pub async fn admin_login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<AdminLoginRequest>,
) -> AuthResult<Json<AdminLoginResponse>>
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let origin = request_origin(&headers, addr);

    let use_case = AdminLoginUseCase::new(
        state.store.clone(),
        state.store.clone(),
        state.store.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let input = AdminLoginInput {
        email: req.email,
        password: req.password,
    };
    use_case.start(input, &origin).await?;

    Ok(Json(AdminLoginResponse { otp_sent: true }))
}

/// POST /api/admin/verify-otp
pub async fn admin_verify<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<AdminVerifyRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let origin = request_origin(&headers, addr);

    let use_case = AdminLoginUseCase::new(
        state.store.clone(),
        state.store.clone(),
        state.store.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let input = AdminVerifyInput {
        email: req.email,
        code: req.code,
    };
    let output = use_case.verify(input, &origin).await?;

    let cookie = set_cookie_header(&state.config.admin_cookie(), &output.session_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AdminVerifyResponse {
            account_id: output.account.account_id.to_string(),
            name: output.account.name,
        }),
    ))
}

/// POST /api/admin/logout
pub async fn admin_logout<R, M>(
    State(state): State<AuthAppState<R, M>>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let cookie = state.config.admin_cookie().build_delete_cookie();
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

/// POST /api/admin/accounts (behind `require_admin_session`)
///
/// Provisioning surface for the external intake flow: creates an
/// active account, generating a credential when none is supplied.
pub async fn provision_account<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<ProvisionAccountRequest>,
) -> AuthResult<Json<ProvisionAccountResponse>>
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let role = match req.role.as_deref() {
        None => AccountRole::Member,
        Some(code) => {
            AccountRole::from_code(code).ok_or(AuthError::InvalidInput("unknown role"))?
        }
    };

    let use_case = ProvisionAccountUseCase::new(state.store.clone());
    let output = use_case
        .execute(ProvisionAccountInput {
            email: req.email,
            name: req.name,
            password: req.password,
            role,
        })
        .await?;

    Ok(Json(ProvisionAccountResponse {
        account_id: output.account_id,
        generated_password: output.generated_password,
    }))
}

/// GET /api/admin/session
pub async fn admin_session_status<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<Json<SessionStatusResponse>>
where
    R: AccountStore + OtpStore + ThrottleStore + Clone + Send + Sync + 'static,
    M: MailDispatcher + Clone + Send + Sync + 'static,
{
    let use_case = ResolveSessionUseCase::new(state.store.clone(), state.config.clone());

    match use_case.resolve_admin(&headers).await {
        Ok(session) => Ok(Json(SessionStatusResponse {
            authenticated: true,
            account_id: Some(session.account.account_id.to_string()),
            email: Some(session.account.email.to_string()),
            name: Some(session.account.name),
            role: Some(session.account.role.code().to_string()),
            expires_at: Some(session.expires_at),
        })),
        Err(_) => Ok(Json(SessionStatusResponse::unauthenticated())),
    }
}
