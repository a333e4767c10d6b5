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

/// Group id that grants access to visitors who are not logged in.
pub const GUESTS_GROUP: i64 = -1;

/// Records with a publication flag and an optional publication window.
pub trait Publishable {
    fn is_published(&self) -> bool;
    fn start(&self) -> Option<DateTime<Utc>>;
    fn stop(&self) -> Option<DateTime<Utc>>;

    /// Published and inside the `[start, stop)` window at `now`.
    fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_published() {
            return false;
        }
        if let Some(start) = self.start() {
            if start > now {
                return false;
            }
        }
        if let Some(stop) = self.stop() {
            if stop <= now {
                return false;
            }
        }
        true
    }
}

/// Records that can be restricted to member groups.
pub trait Protectable {
    fn is_protected(&self) -> bool;
    fn allowed_groups(&self) -> &[i64];
}

/// Decide whether a visitor may see a protected record.
///
/// `member_groups` is `None` for anonymous visitors. Unprotected records are
/// always granted; anonymous visitors only see records that list the guests
/// group; members need at least one group in common with the record.
pub fn is_granted<P: Protectable + ?Sized>(item: &P, member_groups: Option<&[i64]>) -> bool {
    if !item.is_protected() {
        return true;
    }

    let allowed = item.allowed_groups();
    match member_groups {
        None => allowed.contains(&GUESTS_GROUP),
        Some(groups) => groups.iter().any(|g| allowed.contains(g)),
    }
}

/// Free-standing protection settings, for callers that only have the raw values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    pub protected: bool,
    pub groups: Vec<i64>,
}

impl AccessPolicy {
    pub fn new(protected: bool, groups: Vec<i64>) -> Self {
        Self { protected, groups }
    }

    pub fn public() -> Self {
        Self::default()
    }
}

impl Protectable for AccessPolicy {
    fn is_protected(&self) -> bool {
        self.protected
    }

    fn allowed_groups(&self) -> &[i64] {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    struct Window {
        published: bool,
        start: Option<DateTime<Utc>>,
        stop: Option<DateTime<Utc>>,
    }

    impl Publishable for Window {
        fn is_published(&self) -> bool {
            self.published
        }
        fn start(&self) -> Option<DateTime<Utc>> {
            self.start
        }
        fn stop(&self) -> Option<DateTime<Utc>> {
            self.stop
        }
    }

    #[test]
    fn test_unpublished_is_never_visible() {
        let w = Window {
            published: false,
            start: None,
            stop: None,
        };
        assert!(!w.is_visible_at(Utc::now()));
    }

    #[test]
    fn test_publication_window() {
        let now = Utc::now();
        let w = Window {
            published: true,
            start: Some(now - Duration::hours(1)),
            stop: Some(now + Duration::hours(1)),
        };
        assert!(w.is_visible_at(now));
        assert!(!w.is_visible_at(now - Duration::hours(2)));
        assert!(!w.is_visible_at(now + Duration::hours(1)));
    }

    #[test]
    fn test_stop_is_exclusive_and_start_inclusive() {
        let now = Utc::now();
        let w = Window {
            published: true,
            start: Some(now),
            stop: Some(now + Duration::seconds(10)),
        };
        assert!(w.is_visible_at(now));
        assert!(!w.is_visible_at(now + Duration::seconds(10)));
    }

    #[test]
    fn test_unprotected_is_granted_for_everyone() {
        let policy = AccessPolicy::public();
        assert!(is_granted(&policy, None));
        assert!(is_granted(&policy, Some(&[1, 2])));
    }

    #[test]
    fn test_protected_requires_matching_group() {
        let policy = AccessPolicy::new(true, vec![2, 3]);
        assert!(!is_granted(&policy, None));
        assert!(!is_granted(&policy, Some(&[1])));
        assert!(is_granted(&policy, Some(&[1, 3])));
    }

    #[test]
    fn test_guests_group() {
        let policy = AccessPolicy::new(true, vec![GUESTS_GROUP]);
        assert!(is_granted(&policy, None));
        assert!(!is_granted(&policy, Some(&[1])));

        let mixed = AccessPolicy::new(true, vec![GUESTS_GROUP, 5]);
        assert!(is_granted(&mixed, None));
        assert!(is_granted(&mixed, Some(&[5])));
        assert!(!is_granted(&mixed, Some(&[6])));
    }

    #[test]
    fn test_protected_without_groups_denies_everyone() {
        let policy = AccessPolicy::new(true, vec![]);
        assert!(!is_granted(&policy, None));
        assert!(!is_granted(&policy, Some(&[1])));
    }
}
