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

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A logged-in front-end member (`tl_member_session`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    pub member_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(member_id: i64, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            member_id,
            expires_at: now + lifetime,
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let before = Utc::now();
        let session = Session::new(7, Duration::hours(2));

        assert_eq!(session.id.len(), 36);
        assert!(Uuid::parse_str(&session.id).is_ok());
        assert_eq!(session.member_id, 7);
        assert!(session.created_at >= before);

        let diff = session.expires_at - (session.created_at + Duration::hours(2));
        assert!(diff.num_seconds().abs() < 1);
    }

    #[test]
    fn test_unique_ids() {
        let a = Session::new(1, Duration::hours(1));
        let b = Session::new(1, Duration::hours(1));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_expiry() {
        let session = Session::new(1, Duration::minutes(30));
        assert!(!session.is_expired());
        assert!(!session.is_expired_at(session.expires_at - Duration::seconds(1)));
        assert!(session.is_expired_at(session.expires_at));
    }
}
