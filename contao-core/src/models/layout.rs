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

use crate::models::article::is_valid_column;

/// One module placement in a page layout. Module id 0 stands for the
/// articles of the page in that column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutModule {
    pub module_id: i64,
    pub column: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl LayoutModule {
    pub fn new(module_id: i64, column: &str) -> Self {
        Self {
            module_id,
            column: column.to_string(),
            enabled: true,
        }
    }

    pub fn is_article_placeholder(&self) -> bool {
        self.module_id == 0
    }
}

/// A page layout (`tl_layout`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layout {
    pub id: Option<i64>,
    pub name: String,
    pub template: String,
    pub modules: Vec<LayoutModule>,
    pub css_class: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Layout {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            template: "fe_page".to_string(),
            modules: vec![LayoutModule::new(0, "main")],
            css_class: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Enabled placements, in layout order.
    pub fn active_modules(&self) -> impl Iterator<Item = &LayoutModule> {
        self.modules.iter().filter(|m| m.enabled)
    }

    pub fn is_valid(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Layout name cannot be empty".to_string());
        }
        if let Some(bad) = self.modules.iter().find(|m| !is_valid_column(&m.column)) {
            return Err(format!("Unknown layout column '{}'", bad.column));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_layout_places_articles_in_main() {
        let layout = Layout::new("Default".to_string());
        assert_eq!(layout.template, "fe_page");
        assert_eq!(layout.modules.len(), 1);
        assert!(layout.modules[0].is_article_placeholder());
        assert!(layout.is_valid().is_ok());
    }

    #[test]
    fn test_active_modules_skips_disabled() {
        let mut layout = Layout::new("Default".to_string());
        let mut disabled = LayoutModule::new(4, "left");
        disabled.enabled = false;
        layout.modules.push(disabled);
        layout.modules.push(LayoutModule::new(5, "header"));
        let ids: Vec<i64> = layout.active_modules().map(|m| m.module_id).collect();
        assert_eq!(ids, vec![0, 5]);
    }

    #[test]
    fn test_enabled_defaults_to_true_when_deserializing() {
        let module: LayoutModule =
            serde_json::from_str(r#"{"module_id": 3, "column": "header"}"#).unwrap();
        assert!(module.enabled);
    }

    #[test]
    fn test_invalid_column() {
        let mut layout = Layout::new("Default".to_string());
        layout.modules.push(LayoutModule::new(2, "aside"));
        assert!(layout.is_valid().is_err());
    }
}
