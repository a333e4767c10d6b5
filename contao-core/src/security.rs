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

use serde::Serialize;

use crate::models::member::Member;
use crate::visibility::{is_granted, Protectable};

/// Where a request renders: the public site or a back-end preview of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Scope {
    #[default]
    Frontend,
    Backend,
}

impl Scope {
    pub fn is_backend(&self) -> bool {
        matches!(self, Scope::Backend)
    }
}

/// An authenticated member with the groups that are active right now.
#[derive(Debug, Clone, Serialize)]
pub struct FrontendUser {
    pub member: Member,
    pub groups: Vec<i64>,
    pub session_id: String,
}

/// What a request knows about its visitor.
#[derive(Debug, Clone, Default)]
pub struct TokenChecker {
    user: Option<FrontendUser>,
    preview: bool,
}

impl TokenChecker {
    pub fn new(user: Option<FrontendUser>, preview: bool) -> Self {
        Self { user, preview }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&FrontendUser> {
        self.user.as_ref()
    }

    pub fn member(&self) -> Option<&Member> {
        self.user.as_ref().map(|u| &u.member)
    }

    pub fn has_frontend_user(&self) -> bool {
        self.user.is_some()
    }

    /// A back-end user previews the site, so unpublished records are shown.
    pub fn is_preview_mode(&self) -> bool {
        self.preview
    }

    /// Group ids of the logged-in member, `None` for guests.
    pub fn groups(&self) -> Option<&[i64]> {
        self.user.as_ref().map(|u| u.groups.as_slice())
    }

    pub fn is_granted<P: Protectable + ?Sized>(&self, item: &P) -> bool {
        is_granted(item, self.groups())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::{AccessPolicy, GUESTS_GROUP};

    fn user(groups: Vec<i64>) -> FrontendUser {
        let member =
            Member::new("jdoe".to_string(), "jdoe@example.com".to_string(), "secret123").unwrap();
        FrontendUser {
            member,
            groups,
            session_id: "s1".to_string(),
        }
    }

    #[test]
    fn test_anonymous() {
        let checker = TokenChecker::anonymous();
        assert!(!checker.has_frontend_user());
        assert!(!checker.is_preview_mode());
        assert!(checker.groups().is_none());
        assert!(checker.is_granted(&AccessPolicy::public()));
        assert!(checker.is_granted(&AccessPolicy::new(true, vec![GUESTS_GROUP])));
        assert!(!checker.is_granted(&AccessPolicy::new(true, vec![1])));
    }

    #[test]
    fn test_member_groups() {
        let checker = TokenChecker::new(Some(user(vec![2, 3])), false);
        assert_eq!(checker.member().unwrap().username, "jdoe");
        assert!(checker.is_granted(&AccessPolicy::new(true, vec![3])));
        assert!(!checker.is_granted(&AccessPolicy::new(true, vec![GUESTS_GROUP])));
    }

    #[test]
    fn test_scope() {
        assert!(!Scope::default().is_backend());
        assert!(Scope::Backend.is_backend());
    }
}
