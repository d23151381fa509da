//! Session Token Claims
//!
//! Closed, typed claim shapes per cookie kind. The `auth_session`
//! cookie carries [`UserClaims`], the `admin_session` cookie carries
//! [`AdminClaims`]; tokens missing a required field do not decode.

use serde::{Deserialize, Serialize};

use crate::domain::entity::account::Account;
use crate::domain::value_object::account_id::AccountId;
use crate::domain::value_object::account_role::AccountRole;

/// Claims for the member session cookie (`auth_session`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Account identifier
    pub sub: String,
    /// Normalized email
    pub email: String,
    /// Display name
    pub name: String,
}

impl UserClaims {
    pub fn for_account(account: &Account) -> Self {
        Self {
            sub: account.account_id.to_string(),
            email: account.email.to_string(),
            name: account.name.clone(),
        }
    }

    /// Subject as a typed account id, if well-formed
    pub fn account_id(&self) -> Option<AccountId> {
        AccountId::parse(&self.sub).ok()
    }
}

/// Claims for the administrator session cookie (`admin_session`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Account identifier
    pub sub: String,
    /// Normalized email
    pub email: String,
    /// Role marker, `"admin"` for administrator sessions
    pub role: String,
}

impl AdminClaims {
    pub fn for_account(account: &Account) -> Self {
        Self {
            sub: account.account_id.to_string(),
            email: account.email.to_string(),
            role: AccountRole::Admin.code().to_string(),
        }
    }

    /// Whether the role marker is the administrator one
    pub fn is_admin_role(&self) -> bool {
        self.role == AccountRole::Admin.code()
    }

    /// Subject as a typed account id, if well-formed
    pub fn account_id(&self) -> Option<AccountId> {
        AccountId::parse(&self.sub).ok()
    }
}
