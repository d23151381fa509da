//! Application Layer
//!
//! Use cases and application services.

pub mod admin_login;
pub mod change_password;
pub mod config;
pub mod login;
pub mod provision_account;
pub mod resolve_session;
pub mod throttle;

// Re-exports
pub use admin_login::{AdminLoginInput, AdminLoginUseCase, AdminVerifyInput, AdminVerifyOutput};
pub use change_password::{ChangePasswordInput, ChangePasswordUseCase};
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use provision_account::{
    ProvisionAccountInput, ProvisionAccountOutput, ProvisionAccountUseCase,
};
pub use resolve_session::{ResolveSessionUseCase, ResolvedSession};
pub use throttle::ThrottleGuard;
