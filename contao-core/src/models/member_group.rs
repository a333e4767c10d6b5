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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::visibility::Publishable;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberGroup {
    pub id: Option<i64>,
    pub name: String,
    pub disable: bool,
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    /// Redirect members of this group to `jump_to` after login.
    pub redirect: bool,
    pub jump_to: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberGroup {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            disable: false,
            start: None,
            stop: None,
            redirect: false,
            jump_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> i64 {
        self.id.unwrap_or_default()
    }

    pub fn login_redirect(&self) -> Option<i64> {
        if self.redirect {
            self.jump_to
        } else {
            None
        }
    }
}

impl Publishable for MemberGroup {
    fn is_published(&self) -> bool {
        !self.disable
    }

    fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    fn stop(&self) -> Option<DateTime<Utc>> {
        self.stop
    }
}

/// Ids of the groups that are active at `now`, in the member's order.
pub fn effective_groups(member_groups: &[i64], groups: &[MemberGroup], now: DateTime<Utc>) -> Vec<i64> {
    member_groups
        .iter()
        .copied()
        .filter(|id| {
            groups
                .iter()
                .any(|g| g.id == Some(*id) && g.is_visible_at(now))
        })
        .collect()
}

/// The first login redirect among the member's active groups.
pub fn login_redirect(member_groups: &[i64], groups: &[MemberGroup], now: DateTime<Utc>) -> Option<i64> {
    effective_groups(member_groups, groups, now)
        .into_iter()
        .filter_map(|id| groups.iter().find(|g| g.id == Some(id)))
        .find_map(|g| g.login_redirect())
}
