//! PostgreSQL Store Implementations

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{account::Account, otp_code::OtpCode, throttle::ThrottleRecord};
use crate::domain::repository::{AccountStore, OtpStore, ThrottleStore};
use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, account_status::AccountStatus,
    credentials::SecretDigest, email::Email,
};
use crate::error::{AuthError, AuthResult};

/// Throttle records untouched this long are garbage
const THROTTLE_RETENTION_DAYS: i64 = 7;

/// PostgreSQL-backed auth store
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Startup housekeeping: expired OTP records and stale throttle
    /// records. Neither matters for correctness - expiry and windows
    /// are checked at use time - but the tables stay small.
    pub async fn cleanup_expired(&self) -> AuthResult<(u64, u64)> {
        let now = Utc::now();
        let otps = OtpStore::delete_expired(self, now).await?;
        let throttles =
            ThrottleStore::delete_stale(self, now - Duration::days(THROTTLE_RETENTION_DAYS))
                .await?;

        tracing::info!(
            otp_codes_deleted = otps,
            throttle_records_deleted = throttles,
            "Cleaned up expired auth records"
        );

        Ok((otps, throttles))
    }
}

// ============================================================================
// Account Store Implementation
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    email: String,
    display_name: String,
    secret_digest: String,
    role: i16,
    status: i16,
    last_login_at: Option<DateTime<Utc>>,
    login_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let role = AccountRole::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("invalid account role id: {}", self.role)))?;
        let status = AccountStatus::from_id(self.status).ok_or_else(|| {
            AuthError::Internal(format!("invalid account status id: {}", self.status))
        })?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            email: Email::from_stored(self.email),
            name: self.display_name,
            secret_digest: SecretDigest::from_stored(self.secret_digest),
            role,
            status,
            last_login_at: self.last_login_at,
            login_count: self.login_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ACCOUNT: &str = r#"
    SELECT
        account_id,
        email,
        display_name,
        secret_digest,
        role,
        status,
        last_login_at,
        login_count,
        created_at,
        updated_at
    FROM accounts
"#;

impl AccountStore for PgAuthStore {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                email,
                display_name,
                secret_digest,
                role,
                status,
                last_login_at,
                login_count,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.email.as_str())
        .bind(&account.name)
        .bind(account.secret_digest.as_str())
        .bind(account.role.id())
        .bind(account.status.id())
        .bind(account.last_login_at)
        .bind(account.login_count)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!("{SELECT_ACCOUNT} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row =
            sqlx::query_as::<_, AccountRow>(&format!("{SELECT_ACCOUNT} WHERE account_id = $1"))
                .bind(account_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn record_login(&self, account_id: &AccountId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET last_login_at = $2,
                login_count = login_count + 1,
                updated_at = $2
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_secret(
        &self,
        account_id: &AccountId,
        digest: &SecretDigest,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET secret_digest = $2,
                updated_at = $3
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(digest.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// OTP Store Implementation
// ============================================================================

#[derive(sqlx::FromRow)]
struct OtpRow {
    email: String,
    code_digest: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl OtpRow {
    fn into_otp(self) -> OtpCode {
        OtpCode {
            email: Email::from_stored(self.email),
            code_digest: SecretDigest::from_stored(self.code_digest),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

impl OtpStore for PgAuthStore {
    async fn upsert(&self, code: &OtpCode) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO otp_codes (email, code_digest, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET code_digest = EXCLUDED.code_digest,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(code.email.as_str())
        .bind(code.code_digest.as_str())
        .bind(code.created_at)
        .bind(code.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<OtpCode>> {
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
            SELECT email, code_digest, created_at, expires_at
            FROM otp_codes
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_otp()))
    }

    async fn delete_by_email(&self, email: &Email) -> AuthResult<()> {
        sqlx::query("DELETE FROM otp_codes WHERE email = $1")
            .bind(email.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM otp_codes WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Throttle Store Implementation
// ============================================================================

#[derive(sqlx::FromRow)]
struct ThrottleRow {
    throttle_key: String,
    failure_count: i32,
    first_failure_at: DateTime<Utc>,
    last_failure_at: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
}

impl ThrottleRow {
    fn into_record(self) -> ThrottleRecord {
        ThrottleRecord {
            key: self.throttle_key,
            failure_count: self.failure_count.max(0) as u32,
            first_failure_at: self.first_failure_at,
            last_failure_at: self.last_failure_at,
            locked_until: self.locked_until,
        }
    }
}

impl ThrottleStore for PgAuthStore {
    async fn find_by_key(&self, key: &str) -> AuthResult<Option<ThrottleRecord>> {
        let row = sqlx::query_as::<_, ThrottleRow>(
            r#"
            SELECT throttle_key, failure_count, first_failure_at, last_failure_at, locked_until
            FROM throttle_records
            WHERE throttle_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_record()))
    }

    async fn upsert(&self, record: &ThrottleRecord) -> AuthResult<()> {
        // Atomic upsert: concurrent writers cannot lose the row itself,
        // only interleave counter values.
        sqlx::query(
            r#"
            INSERT INTO throttle_records (
                throttle_key,
                failure_count,
                first_failure_at,
                last_failure_at,
                locked_until
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (throttle_key) DO UPDATE
            SET failure_count = EXCLUDED.failure_count,
                first_failure_at = EXCLUDED.first_failure_at,
                last_failure_at = EXCLUDED.last_failure_at,
                locked_until = EXCLUDED.locked_until
            "#,
        )
        .bind(&record.key)
        .bind(record.failure_count as i32)
        .bind(record.first_failure_at)
        .bind(record.last_failure_at)
        .bind(record.locked_until)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_by_key(&self, key: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM throttle_records WHERE throttle_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_stale(&self, before: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM throttle_records WHERE last_failure_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}
