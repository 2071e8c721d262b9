//! Verification sessions
//!
//! Keyed store of short-lived verification codes: identifier (email or
//! phone) -> {code, expiry, attempts}. Owned by `AppState` and passed by
//! reference; expired sessions are evicted by a periodic task. Code
//! delivery (email/SMS) is an external collaborator.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::util::now_millis;

/// Session lifetime: 10 minutes
const CODE_TTL_MILLIS: i64 = 10 * 60 * 1000;
/// Wrong-code attempts allowed before the session is locked
const MAX_ATTEMPTS: u32 = 5;

struct Session {
    code: String,
    expires_at: i64,
    attempts: u32,
}

/// In-memory verification session store
#[derive(Clone, Default)]
pub struct VerificationSessions {
    inner: Arc<Mutex<HashMap<String, Session>>>,
}

fn generate_code() -> String {
    use rand::Rng;
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

impl VerificationSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh code for an identifier, replacing any pending session.
    /// Returns the code for the delivery collaborator.
    pub async fn issue(&self, identifier: &str) -> String {
        self.issue_at(identifier, generate_code(), now_millis())
            .await
    }

    async fn issue_at(&self, identifier: &str, code: String, now: i64) -> String {
        let mut map = self.inner.lock().await;
        map.insert(
            identifier.to_owned(),
            Session {
                code: code.clone(),
                expires_at: now + CODE_TTL_MILLIS,
                attempts: 0,
            },
        );
        code
    }

    /// Verify a submitted code. A correct code consumes the session; a
    /// wrong one counts an attempt until the session locks.
    pub async fn verify(&self, identifier: &str, code: &str) -> AppResult<()> {
        self.verify_at(identifier, code, now_millis()).await
    }

    async fn verify_at(&self, identifier: &str, code: &str, now: i64) -> AppResult<()> {
        let mut map = self.inner.lock().await;
        let session = map
            .get_mut(identifier)
            .ok_or(AppError::new(ErrorCode::VerificationCodeInvalid))?;

        if now >= session.expires_at {
            map.remove(identifier);
            return Err(AppError::new(ErrorCode::VerificationCodeExpired));
        }
        if session.attempts >= MAX_ATTEMPTS {
            return Err(AppError::new(ErrorCode::TooManyAttempts));
        }
        if session.code != code {
            session.attempts += 1;
            return Err(AppError::new(ErrorCode::VerificationCodeInvalid));
        }

        map.remove(identifier);
        Ok(())
    }

    /// Remove expired sessions.
    pub async fn evict_expired(&self) {
        self.evict_expired_at(now_millis()).await;
    }

    async fn evict_expired_at(&self, now: i64) {
        let mut map = self.inner.lock().await;
        map.retain(|_, session| now < session.expires_at);
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_and_verify() {
        let sessions = VerificationSessions::new();
        let code = sessions.issue_at("a@example.com", "123456".into(), 0).await;
        assert_eq!(code, "123456");

        sessions.verify_at("a@example.com", "123456", 1000).await.unwrap();
        // Consumed: a second verify fails
        let err = sessions
            .verify_at("a@example.com", "123456", 1000)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationCodeInvalid);
    }

    #[tokio::test]
    async fn test_wrong_code_counts_attempts() {
        let sessions = VerificationSessions::new();
        sessions.issue_at("a@example.com", "123456".into(), 0).await;

        for _ in 0..MAX_ATTEMPTS {
            let err = sessions
                .verify_at("a@example.com", "000000", 1000)
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::VerificationCodeInvalid);
        }
        // Locked now, even with the right code
        let err = sessions
            .verify_at("a@example.com", "123456", 1000)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TooManyAttempts);
    }

    #[tokio::test]
    async fn test_expired_code() {
        let sessions = VerificationSessions::new();
        sessions.issue_at("a@example.com", "123456".into(), 0).await;

        let err = sessions
            .verify_at("a@example.com", "123456", CODE_TTL_MILLIS)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationCodeExpired);
        // Session was removed on expiry
        assert_eq!(sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_reissue_replaces_pending_code() {
        let sessions = VerificationSessions::new();
        sessions.issue_at("a@example.com", "111111".into(), 0).await;
        sessions.issue_at("a@example.com", "222222".into(), 1000).await;

        let err = sessions
            .verify_at("a@example.com", "111111", 2000)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationCodeInvalid);
        sessions.verify_at("a@example.com", "222222", 2000).await.unwrap();
    }

    #[tokio::test]
    async fn test_eviction() {
        let sessions = VerificationSessions::new();
        sessions.issue_at("a@example.com", "111111".into(), 0).await;
        sessions.issue_at("b@example.com", "222222".into(), 5000).await;

        sessions.evict_expired_at(CODE_TTL_MILLIS + 1000).await;
        assert_eq!(sessions.len().await, 1);

        sessions.evict_expired_at(CODE_TTL_MILLIS + 6000).await;
        assert_eq!(sessions.len().await, 0);
    }
}
