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
use serde_json::Value;

use crate::models::headline::{CssId, Headline};
use crate::visibility::{Protectable, Publishable};

/// Element types the front end knows how to render.
pub const ELEMENT_TYPES: &[&str] = &[
    "headline",
    "text",
    "html",
    "markdown",
    "list",
    "table",
    "code",
    "hyperlink",
    "toplink",
    "module",
    "alias",
];

/// A content element (`tl_content`) belonging to an article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentElement {
    pub id: Option<i64>,
    pub pid: i64,
    pub sorting: i64,
    pub element_type: String,
    pub headline: Option<Headline>,
    pub css: CssId,
    pub invisible: bool,
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    pub protected: bool,
    pub groups: Vec<i64>,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentElement {
    pub fn new(pid: i64, element_type: String, data: Value) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            pid,
            sorting: 0,
            element_type,
            headline: None,
            css: CssId::default(),
            invisible: false,
            start: None,
            stop: None,
            protected: false,
            groups: Vec::new(),
            data,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> i64 {
        self.id.unwrap_or_default()
    }

    pub fn with_headline(mut self, unit: &str, value: &str) -> Self {
        self.headline = Some(Headline::new(unit, value));
        self
    }

    /// String field from the type-specific data, empty when missing.
    pub fn text(&self, field: &str) -> String {
        self.data
            .get(field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    }

    pub fn flag(&self, field: &str) -> bool {
        self.data
            .get(field)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn number(&self, field: &str) -> Option<i64> {
        self.data.get(field).and_then(|v| v.as_i64())
    }

    pub fn strings(&self, field: &str) -> Vec<String> {
        self.data
            .get(field)
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_valid(&self) -> Result<(), String> {
        if self.element_type.trim().is_empty() {
            return Err("Element type cannot be empty".to_string());
        }
        if !self.data.is_object() {
            return Err("Element data must be a JSON object".to_string());
        }
        Ok(())
    }
}

impl Publishable for ContentElement {
    fn is_published(&self) -> bool {
        !self.invisible
    }

    fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    fn stop(&self) -> Option<DateTime<Utc>> {
        self.stop
    }
}

impl Protectable for ContentElement {
    fn is_protected(&self) -> bool {
        self.protected
    }

    fn allowed_groups(&self) -> &[i64] {
        &self.groups
    }
}
