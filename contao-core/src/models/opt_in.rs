use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of registration activation tokens.
pub const REGISTRATION_PREFIX: &str = "reg";
/// Prefix of password reset tokens.
pub const PASSWORD_PREFIX: &str = "pw";

const TOKEN_BYTES: usize = 12;
const VALIDITY_HOURS: i64 = 24;
const RETENTION_DAYS: i64 = 3 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptInError {
    #[error("Invalid or unknown token")]
    NotFound,

    #[error("The token has expired")]
    Expired,

    #[error("The token has already been used")]
    AlreadyConfirmed,

    #[error("The token does not belong to this record")]
    RelatedMismatch,
}

/// Double opt-in token (`tl_opt_in`) sent by e-mail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptInToken {
    pub id: Option<i64>,
    pub token: String,
    pub email: String,
    pub related_table: String,
    pub related_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub remove_on: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl OptInToken {
    pub fn new(prefix: &str, email: String, related_table: &str, related_ids: Vec<i64>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            token: Self::generate_token(prefix),
            email,
            related_table: related_table.to_string(),
            related_ids,
            created_at: now,
            valid_until: now + Duration::hours(VALIDITY_HOURS),
            remove_on: now + Duration::days(RETENTION_DAYS),
            confirmed_at: None,
        }
    }

    /// `<prefix>-<24 hex chars>`
    pub fn generate_token(prefix: &str) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        format!("{}-{}", prefix, hex::encode(bytes))
    }

    pub fn has_prefix(token: &str, prefix: &str) -> bool {
        token
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .map(|rest| rest.len() == TOKEN_BYTES * 2 && rest.chars().all(|c| c.is_ascii_hexdigit()))
            .unwrap_or(false)
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.valid_until
    }

    /// Check that the token is usable for the given record without confirming it.
    pub fn check(&self, related_table: &str, related_id: i64, now: DateTime<Utc>) -> Result<(), OptInError> {
        if self.is_confirmed() {
            return Err(OptInError::AlreadyConfirmed);
        }
        if !self.is_valid(now) {
            return Err(OptInError::Expired);
        }
        if self.related_table != related_table || !self.related_ids.contains(&related_id) {
            return Err(OptInError::RelatedMismatch);
        }
        Ok(())
    }

    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), OptInError> {
        if self.is_confirmed() {
            return Err(OptInError::AlreadyConfirmed);
        }
        if !self.is_valid(now) {
            return Err(OptInError::Expired);
        }
        self.confirmed_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> OptInToken {
        OptInToken::new(
            REGISTRATION_PREFIX,
            "jdoe@example.com".to_string(),
            "tl_member",
            vec![5],
        )
    }

    #[test]
    fn test_token_format() {
        let t = token();
        assert!(t.token.starts_with("reg-"));
        assert_eq!(t.token.len(), 4 + 24);
        assert!(OptInToken::has_prefix(&t.token, REGISTRATION_PREFIX));
        assert!(!OptInToken::has_prefix(&t.token, PASSWORD_PREFIX));
        assert!(!OptInToken::has_prefix("reg-xyz", REGISTRATION_PREFIX));
    }

    #[test]
    fn test_validity_window() {
        let t = token();
        assert_eq!(t.valid_until - t.created_at, Duration::hours(24));
        assert_eq!(t.remove_on - t.created_at, Duration::days(3 * 365));
        assert!(t.is_valid(t.created_at));
        assert!(!t.is_valid(t.valid_until));
    }

    #[test]
    fn test_confirm_once() {
        let mut t = token();
        let now = Utc::now();
        assert_eq!(t.confirm(now), Ok(()));
        assert!(t.is_confirmed());
        assert_eq!(t.confirm(now), Err(OptInError::AlreadyConfirmed));
    }

    #[test]
    fn test_confirm_expired() {
        let mut t = token();
        let later = t.valid_until + Duration::seconds(1);
        assert_eq!(t.confirm(later), Err(OptInError::Expired));
        assert!(!t.is_confirmed());
    }

    #[test]
    fn test_check_related_record() {
        let t = token();
        let now = Utc::now();
        assert_eq!(t.check("tl_member", 5, now), Ok(()));
        assert_eq!(t.check("tl_member", 6, now), Err(OptInError::RelatedMismatch));
        assert_eq!(t.check("tl_page", 5, now), Err(OptInError::RelatedMismatch));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(token().token, token().token);
    }
}
