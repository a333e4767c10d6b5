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

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::RngCore;

pub const REQUEST_TOKEN_COOKIE: &str = "contao_csrf_token";
pub const REQUEST_TOKEN_FIELD: &str = "REQUEST_TOKEN";

const TOKEN_LENGTH: usize = 32;

/// Double-submit request token: the same value lives in a cookie and in
/// every form the page renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    pub value: String,
    /// Not yet stored in the visitor's cookie.
    pub is_new: bool,
}

impl RequestToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            value: hex::encode(bytes),
            is_new: true,
        }
    }

    /// The token from the cookie, or a fresh one.
    pub fn from_jar(jar: &CookieJar) -> Self {
        match jar.get(REQUEST_TOKEN_COOKIE) {
            Some(cookie) if is_well_formed(cookie.value()) => Self {
                value: cookie.value().to_string(),
                is_new: false,
            },
            _ => Self::generate(),
        }
    }

    /// A submitted form is only trusted when the cookie existed before and
    /// the form echoes its value.
    pub fn verify(&self, submitted: Option<&str>) -> bool {
        if self.is_new {
            return false;
        }
        match submitted {
            Some(value) => constant_time_eq(self.value.as_bytes(), value.as_bytes()),
            None => false,
        }
    }

    pub fn cookie(&self, secure: bool) -> Cookie<'static> {
        Cookie::build((REQUEST_TOKEN_COOKIE, self.value.clone()))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

fn is_well_formed(value: &str) -> bool {
    value.len() == TOKEN_LENGTH * 2 && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_is_not_trusted() {
        let token = RequestToken::generate();
        assert_eq!(token.value.len(), 64);
        assert!(!token.verify(Some(token.value.as_str())));
    }

    #[test]
    fn test_token_from_cookie() {
        let value = "ab".repeat(32);
        let jar = CookieJar::new().add(Cookie::new(REQUEST_TOKEN_COOKIE, value.clone()));
        let token = RequestToken::from_jar(&jar);
        assert!(!token.is_new);
        assert!(token.verify(Some(value.as_str())));
        assert!(!token.verify(Some("ab")));
        assert!(!token.verify(None));
    }

    #[test]
    fn test_malformed_cookie_is_replaced() {
        let jar = CookieJar::new().add(Cookie::new(REQUEST_TOKEN_COOKIE, "<script>"));
        let token = RequestToken::from_jar(&jar);
        assert!(token.is_new);
        assert_ne!(token.value, "<script>");
    }
}
