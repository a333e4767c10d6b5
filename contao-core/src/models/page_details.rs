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
use serde::Serialize;
use thiserror::Error;

use crate::models::page::{Page, PageType};
use crate::visibility::{Protectable, Publishable};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageDetailsError {
    #[error("Page chain is empty")]
    EmptyChain,

    #[error("Page chain does not start with a root page (found page {0})")]
    MissingRoot(i64),

    #[error("Page {0} has not been saved")]
    Unsaved(String),
}

/// A page together with everything it inherits from its ancestors.
#[derive(Debug, Clone, Serialize)]
pub struct PageDetails {
    pub page: Page,
    /// Page ids from the website root down to (and including) this page.
    pub trail: Vec<i64>,
    pub root_id: i64,
    pub root_title: String,
    pub root_alias: String,
    pub language: String,
    pub dns: String,
    pub url_suffix: String,
    pub protected: bool,
    pub groups: Vec<i64>,
    pub layout: Option<i64>,
    /// Every page of the trail is published right now.
    pub is_public: bool,
}

impl PageDetails {
    /// Build the details from the ancestor chain, ordered root first.
    pub fn from_chain(chain: &[Page], now: DateTime<Utc>) -> Result<Self, PageDetailsError> {
        let root = chain.first().ok_or(PageDetailsError::EmptyChain)?;
        let page = chain.last().ok_or(PageDetailsError::EmptyChain)?;

        if root.page_type != PageType::Root {
            return Err(PageDetailsError::MissingRoot(root.id()));
        }

        let mut trail = Vec::with_capacity(chain.len());
        for p in chain {
            let id = p.id.ok_or_else(|| PageDetailsError::Unsaved(p.title.clone()))?;
            trail.push(id);
        }

        // The nearest protected page wins, starting from the page itself.
        let (protected, groups) = chain
            .iter()
            .rev()
            .find(|p| p.protected)
            .map(|p| (true, p.groups.clone()))
            .unwrap_or((false, Vec::new()));

        let layout = chain
            .iter()
            .rev()
            .find(|p| p.include_layout && p.layout.is_some())
            .and_then(|p| p.layout);

        let is_public = chain.iter().all(|p| p.is_visible_at(now));

        Ok(Self {
            page: page.clone(),
            trail,
            root_id: root.id(),
            root_title: root.title.clone(),
            root_alias: root.alias.clone(),
            language: root.language.clone(),
            dns: root.dns.clone(),
            url_suffix: root.url_suffix.clone(),
            protected,
            groups,
            layout,
            is_public,
        })
    }

    pub fn id(&self) -> i64 {
        self.page.id()
    }

    pub fn pid(&self) -> Option<i64> {
        self.page.pid
    }

    pub fn in_trail(&self, page_id: i64) -> bool {
        self.trail.contains(&page_id)
    }

    /// Nesting level of the page below its root (root = 0).
    pub fn level(&self) -> usize {
        self.trail.len().saturating_sub(1)
    }
}

impl Protectable for PageDetails {
    fn is_protected(&self) -> bool {
        self.protected
    }

    fn allowed_groups(&self) -> &[i64] {
        &self.groups
    }
}
