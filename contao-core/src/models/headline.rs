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

use serde::{Deserialize, Serialize};

/// A headline with its HTML heading level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Headline {
    pub unit: String,
    pub value: String,
}

impl Headline {
    pub fn new(unit: &str, value: &str) -> Self {
        Self {
            unit: unit.to_string(),
            value: value.to_string(),
        }
    }

    /// Heading tag, falling back to `h2` for anything that is not `h1`..`h6`.
    pub fn tag(&self) -> &str {
        match self.unit.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => &self.unit,
            _ => "h2",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// CSS id and class pair attached to modules, articles and elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CssId {
    pub id: String,
    pub class: String,
}

impl CssId {
    pub fn new(id: &str, class: &str) -> Self {
        Self {
            id: id.to_string(),
            class: class.to_string(),
        }
    }

    /// Join a base class (e.g. `ce_text`) with the configured classes.
    pub fn class_list(&self, base: &str) -> String {
        let custom = self.class.trim();
        if custom.is_empty() {
            base.to_string()
        } else {
            format!("{} {}", base, custom)
        }
    }
}
