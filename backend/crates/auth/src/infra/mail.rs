//! Mail Dispatch Implementations
//!
//! Delivery transport is an external concern. `LogMailer` writes the
//! message to the log instead of sending it - how one-time codes are
//! read in credential-less local development.

use crate::domain::repository::MailDispatcher;
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// Log-only mail dispatcher
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl MailDispatcher for LogMailer {
    async fn send(&self, to: &Email, subject: &str, text: &str, _html: &str) -> AuthResult<()> {
        tracing::info!(to = %to, subject, body = text, "Mail dispatch (log only)");
        Ok(())
    }
}
