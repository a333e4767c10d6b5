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

use crate::visibility::Protectable;

/// An indexed page (`tl_search`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchEntry {
    pub id: Option<i64>,
    pub root_id: i64,
    pub page_id: i64,
    pub url: String,
    pub title: String,
    pub text: String,
    pub checksum: String,
    pub protected: bool,
    pub groups: Vec<i64>,
    pub language: String,
    pub indexed_at: DateTime<Utc>,
}

impl Protectable for SearchEntry {
    fn is_protected(&self) -> bool {
        self.protected
    }

    fn allowed_groups(&self) -> &[i64] {
        &self.groups
    }
}

/// Occurrences of one term in one indexed page (`tl_search_term`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub term: String,
    pub relevance: i64,
}

/// A search hit with its relevance.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub entry: SearchEntry,
    pub relevance: i64,
    /// Relevance relative to the best hit, in percent.
    pub percent: u32,
    pub excerpt: String,
}
