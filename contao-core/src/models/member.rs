// Contao - front-end rendering core for the Contao CMS
// Copyright (C) 2025 Contao Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::Result;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Failed logins after which an account is locked.
pub const MAX_LOGIN_ATTEMPTS: i64 = 3;

/// How long an account stays locked.
pub const LOCK_PERIOD_MINUTES: i64 = 5;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub groups: Vec<i64>,
    pub login: bool,
    pub disable: bool,
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub login_attempts: i64,
    pub last_login: Option<DateTime<Utc>>,
    pub current_login: Option<DateTime<Utc>>,
    pub date_added: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Create a new member that may log in, with a hashed password
    pub fn new(username: String, email: String, password: &str) -> Result<Self> {
        Self::validate_username(&username)
            .map_err(|e| anyhow::anyhow!("Invalid username: {}", e))?;
        Self::validate_email(&email).map_err(|e| anyhow::anyhow!("Invalid email: {}", e))?;

        let password_hash = Self::hash_password(password)?;
        let now = Utc::now();

        Ok(Self {
            id: None,
            username,
            email,
            firstname: String::new(),
            lastname: String::new(),
            password_hash,
            groups: Vec::new(),
            login: true,
            disable: false,
            start: None,
            stop: None,
            locked_until: None,
            login_attempts: 0,
            last_login: None,
            current_login: None,
            date_added: now,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> i64 {
        self.id.unwrap_or_default()
    }

    /// Hash a password using Argon2
    pub fn hash_password(password: &str) -> Result<String> {
        use argon2::password_hash::rand_core::OsRng;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(password_hash)
    }

    pub fn set_password(&mut self, password: &str) -> Result<()> {
        self.password_hash = Self::hash_password(password)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn verify_password(&self, password: &str) -> Result<bool> {
        use argon2::password_hash::{PasswordHash, PasswordVerifier};

        let parsed_hash = PasswordHash::new(&self.password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn validate_email(email: &str) -> Result<(), String> {
        if email.is_empty() {
            return Err("Email cannot be empty".to_string());
        }

        if email.len() > 255 {
            return Err("Email cannot exceed 255 characters".to_string());
        }

        let email_regex = Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9._%+-]*[a-zA-Z0-9])?@[a-zA-Z0-9]([a-zA-Z0-9.-]*[a-zA-Z0-9])?\.[a-zA-Z]{2,}$")
            .map_err(|e| format!("Failed to compile email regex: {}", e))?;

        if !email_regex.is_match(email) {
            return Err("Invalid email format".to_string());
        }

        Ok(())
    }

    pub fn validate_username(username: &str) -> Result<(), String> {
        if username.len() < 3 {
            return Err("Username must be at least 3 characters".to_string());
        }

        if username.len() > 64 {
            return Err("Username cannot exceed 64 characters".to_string());
        }

        let username_regex = Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._@-]*$")
            .map_err(|e| format!("Failed to compile username regex: {}", e))?;

        if !username_regex.is_match(username) {
            return Err(
                "Username may only contain letters, numbers, dots, hyphens, underscores and @"
                    .to_string(),
            );
        }

        Ok(())
    }

    pub fn validate_password(password: &str) -> Result<(), String> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ));
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname.trim(), self.lastname.trim())
            .trim()
            .to_string()
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        matches!(self.locked_until, Some(until) if until > now)
    }

    /// Active account: login allowed, not disabled, inside the activation window.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        if !self.login || self.disable {
            return false;
        }
        if matches!(self.start, Some(start) if start > now) {
            return false;
        }
        if matches!(self.stop, Some(stop) if stop <= now) {
            return false;
        }
        true
    }

    pub fn can_login(&self, now: DateTime<Utc>) -> bool {
        self.is_active(now) && !self.is_locked(now)
    }

    /// Count a failed attempt; the third one locks the account.
    pub fn register_failed_login(&mut self, now: DateTime<Utc>) {
        self.login_attempts += 1;
        if self.login_attempts >= MAX_LOGIN_ATTEMPTS {
            self.locked_until = Some(now + Duration::minutes(LOCK_PERIOD_MINUTES));
            self.login_attempts = 0;
        }
        self.updated_at = now;
    }

    pub fn register_successful_login(&mut self, now: DateTime<Utc>) {
        self.login_attempts = 0;
        self.locked_until = None;
        self.last_login = self.current_login.or(Some(now));
        self.current_login = Some(now);
        self.updated_at = now;
    }

    pub fn is_valid(&self) -> Result<(), String> {
        Self::validate_username(&self.username)?;
        Self::validate_email(&self.email)?;

        if self.password_hash.is_empty() {
            return Err("Password hash cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> Member {
        Member::new("jdoe".to_string(), "jdoe@example.com".to_string(), "secret123").unwrap()
    }

    #[test]
    fn test_new_member() {
        let member = member();
        assert_eq!(member.username, "jdoe");
        assert!(member.login);
        assert!(!member.disable);
        assert_ne!(member.password_hash, "secret123");
        assert!(member.password_hash.starts_with("$argon2"));
        assert!(member.is_valid().is_ok());
    }

    #[test]
    fn test_new_member_rejects_bad_input() {
        assert!(Member::new("x".to_string(), "x@example.com".to_string(), "secret123").is_err());
        assert!(Member::new("jdoe".to_string(), "not-an-email".to_string(), "secret123").is_err());
    }

    #[test]
    fn test_verify_password() {
        let mut member = member();
        assert!(member.verify_password("secret123").unwrap());
        assert!(!member.verify_password("wrong").unwrap());

        member.set_password("another-pass").unwrap();
        assert!(member.verify_password("another-pass").unwrap());
        assert!(!member.verify_password("secret123").unwrap());
    }

    #[test]
    fn test_verify_password_with_corrupt_hash() {
        let mut member = member();
        member.password_hash = "plain".to_string();
        assert!(member.verify_password("plain").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(Member::validate_password("short").is_err());
        assert!(Member::validate_password("12345678").is_ok());
    }

    #[test]
    fn test_validate_username() {
        assert!(Member::validate_username("john.doe@home").is_ok());
        assert!(Member::validate_username("ab").is_err());
        assert!(Member::validate_username("-john").is_err());
        assert!(Member::validate_username("john doe").is_err());
    }

    #[test]
    fn test_can_login_window() {
        let now = Utc::now();
        let mut member = member();
        assert!(member.can_login(now));

        member.start = Some(now + Duration::hours(1));
        assert!(!member.can_login(now));
        member.start = None;

        member.stop = Some(now);
        assert!(!member.can_login(now));
        member.stop = None;

        member.disable = true;
        assert!(!member.can_login(now));
        member.disable = false;

        member.login = false;
        assert!(!member.can_login(now));
    }

    #[test]
    fn test_third_failed_login_locks_account() {
        let now = Utc::now();
        let mut member = member();

        member.register_failed_login(now);
        member.register_failed_login(now);
        assert!(member.can_login(now));
        assert_eq!(member.login_attempts, 2);

        member.register_failed_login(now);
        assert!(member.is_locked(now));
        assert!(!member.can_login(now));
        assert!(member.can_login(now + Duration::minutes(LOCK_PERIOD_MINUTES)));
    }

    #[test]
    fn test_successful_login_resets_counters() {
        let now = Utc::now();
        let mut member = member();
        member.register_failed_login(now);
        member.register_successful_login(now);
        assert_eq!(member.login_attempts, 0);
        assert_eq!(member.current_login, Some(now));
        assert_eq!(member.last_login, Some(now));

        let later = now + Duration::days(1);
        member.register_successful_login(later);
        assert_eq!(member.last_login, Some(now));
        assert_eq!(member.current_login, Some(later));
    }

    #[test]
    fn test_full_name() {
        let mut member = member();
        assert_eq!(member.full_name(), "");
        member.firstname = "Jane".to_string();
        member.lastname = "Doe".to_string();
        assert_eq!(member.full_name(), "Jane Doe");
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_value(member()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "jdoe");
    }
}
